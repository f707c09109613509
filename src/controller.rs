//! Chat client controller.
//!
//! Owns all mutable UI state (transcript, composer, theme, sidebar,
//! pending image) and sequences submissions against the backend. Hosts
//! drive it with input events and render from its state, reacting to
//! [`UiEvent`]s received over the channel returned by [`ChatController::new`].
//!
//! Submission is split into explicit transitions so the optimistic update
//! and the resolution are separately observable: [`begin_submission`]
//! appends the user message and the placeholder and returns the request
//! to issue; [`complete_submission`] resolves or rolls back. The
//! [`submit`] convenience method chains the two around the HTTP call.
//!
//! [`begin_submission`]: ChatController::begin_submission
//! [`complete_submission`]: ChatController::complete_submission
//! [`submit`]: ChatController::submit

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ApiClient, ChatReply, ChatRequest};
use crate::composer::{
    Composer, ComposerAction, ComposerState, IDLE_PLACEHOLDER, IMAGE_READY_PLACEHOLDER,
    LISTENING_PLACEHOLDER, LOCKED_PLACEHOLDER,
};
use crate::config::ClientConfig;
use crate::conversation::{Conversation, Sender};
use crate::dictation::{DictationEngine, DictationEvent};
use crate::error::Result;
use crate::event::UiEvent;
use crate::theme::{PreferenceStore, Theme};

/// Fallback assistant message shown when a chat request fails.
pub const FALLBACK_REPLY: &str = "Sorry, I could not process your request at this time.";

const EVENT_CHANNEL_CAPACITY: usize = 64;
const DICTATION_CHANNEL_CAPACITY: usize = 16;

/// The chat client controller. See the module docs for the driving model.
pub struct ChatController {
    config: ClientConfig,
    api: ApiClient,
    session_id: Option<String>,
    conversation: Conversation,
    composer: Composer,
    dictation: Box<dyn DictationEngine>,
    dictation_rx: Option<mpsc::Receiver<DictationEvent>>,
    prefs: Box<dyn PreferenceStore>,
    theme: Theme,
    sidebar_collapsed: bool,
    language: String,
    viewport_width: u32,
    pending_image: Option<String>,
    events: mpsc::Sender<UiEvent>,
}

impl ChatController {
    /// Create a controller and the event channel the host listens on.
    ///
    /// The theme is restored from the preference store (dark when nothing
    /// was ever persisted); everything else starts from defaults.
    pub fn new(
        config: ClientConfig,
        session_id: Option<String>,
        dictation: Box<dyn DictationEngine>,
        prefs: Box<dyn PreferenceStore>,
    ) -> (Self, mpsc::Receiver<UiEvent>) {
        let (events, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let theme = prefs.load_theme().unwrap_or(Theme::Dark);
        let controller = Self {
            api: ApiClient::new(&config.api),
            composer: Composer::new(&config.composer),
            language: config.dictation.default_language.clone(),
            config,
            session_id,
            conversation: Conversation::new(),
            dictation,
            dictation_rx: None,
            prefs,
            theme,
            sidebar_collapsed: false,
            viewport_width: 1024,
            pending_image: None,
            events,
        };
        (controller, events_rx)
    }

    // ── State accessors ──────────────────────────────────────────────

    /// The conversation transcript.
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the sidebar is collapsed.
    #[must_use]
    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    /// Selected response/dictation language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Composer state.
    #[must_use]
    pub fn composer_state(&self) -> ComposerState {
        self.composer.state()
    }

    /// Current input text.
    #[must_use]
    pub fn input_text(&self) -> &str {
        self.composer.text()
    }

    /// Pending uploaded image filename, if any.
    #[must_use]
    pub fn pending_image(&self) -> Option<&str> {
        self.pending_image.as_deref()
    }

    /// When the current unlocked recording will lock, for host timer
    /// scheduling.
    #[must_use]
    pub fn lock_deadline(&self) -> Option<Instant> {
        self.composer.lock_deadline()
    }

    // ── History bootstrap ────────────────────────────────────────────

    /// Fetch and replay the stored history for the session, once, before
    /// any interaction. For each record the image renders first, then the
    /// text. Failure is logged and otherwise silent; no history is not an
    /// error.
    pub async fn load_history(&mut self) {
        let Some(session_id) = self.session_id.clone() else {
            return;
        };
        match self.api.chat_history(&session_id).await {
            Ok(records) => {
                info!("loaded {} history messages", records.len());
                for record in &records {
                    if let Some(image) = &record.image_filename {
                        let src = self.api.upload_src(image);
                        self.conversation.push_image(src);
                    }
                    self.conversation.push_text(record.sender, &record.text);
                }
                if !records.is_empty() {
                    self.conversation_changed();
                }
            }
            Err(e) => warn!("failed to fetch chat history: {e}"),
        }
    }

    // ── Text input ───────────────────────────────────────────────────

    /// The host's input control changed.
    pub fn input_changed(&mut self, text: impl Into<String>) {
        self.composer.input_changed(text);
        self.emit(UiEvent::InputRows {
            rows: self.composer.input_rows(),
        });
    }

    // ── Theme, sidebar, language ─────────────────────────────────────

    /// Flip the theme and persist the choice.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.prefs.store_theme(self.theme) {
            warn!("failed to persist theme: {e:#}");
        }
        self.emit(UiEvent::ThemeChanged(self.theme));
    }

    /// Flip the sidebar collapsed state.
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        self.emit(UiEvent::SidebarChanged {
            collapsed: self.sidebar_collapsed,
        });
    }

    /// A click landed somewhere on the page. On narrow viewports a click
    /// outside the sidebar and its toggle controls dismisses it.
    pub fn outside_click(&mut self, inside_sidebar: bool, on_toggle_control: bool) {
        if self.viewport_width > self.config.layout.narrow_breakpoint {
            return;
        }
        if inside_sidebar || on_toggle_control || self.sidebar_collapsed {
            return;
        }
        self.sidebar_collapsed = true;
        self.emit(UiEvent::SidebarChanged { collapsed: true });
    }

    /// The viewport was resized.
    pub fn viewport_resized(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Select the response/dictation language. Takes effect on the next
    /// capture and the next submission.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    // ── Microphone ───────────────────────────────────────────────────

    /// Press on the microphone control.
    pub async fn mic_pressed(&mut self, now: Instant) {
        if self.composer.mic_pressed(now) != ComposerAction::StartDictation {
            return;
        }
        let locale = self.config.dictation.locale_for(&self.language).to_owned();
        let (tx, rx) = mpsc::channel(DICTATION_CHANNEL_CAPACITY);
        match self.dictation.start(&locale, tx).await {
            Ok(()) => {
                debug!("dictation started (locale {locale})");
                self.dictation_rx = Some(rx);
                self.emit(UiEvent::MicListening { active: true });
                self.emit(UiEvent::InputPlaceholder {
                    text: LISTENING_PLACEHOLDER.to_owned(),
                });
            }
            Err(e) => {
                warn!("dictation start failed: {e:#}");
                self.composer.dictation_error();
                self.emit(UiEvent::Alert {
                    message: format!("Speech recognition error: {e:#}"),
                });
                self.restore_idle_placeholder();
            }
        }
    }

    /// The hold timer fired at the lock deadline.
    pub fn hold_elapsed(&mut self, now: Instant) {
        if self.composer.hold_elapsed(now) {
            self.emit(UiEvent::MicLocked { locked: true });
            self.emit(UiEvent::InputPlaceholder {
                text: LOCKED_PLACEHOLDER.to_owned(),
            });
        }
    }

    /// Release of the microphone control.
    pub async fn mic_released(&mut self, now: Instant) {
        let action = self.composer.mic_released(now);
        self.perform_mic_action(action).await;
    }

    /// Pointer left the microphone control.
    pub async fn pointer_left(&mut self, now: Instant) {
        let action = self.composer.pointer_left(now);
        self.perform_mic_action(action).await;
    }

    async fn perform_mic_action(&mut self, action: ComposerAction) {
        match action {
            ComposerAction::StopDictation => {
                self.stop_dictation().await;
            }
            ComposerAction::StopAndSubmit => {
                self.stop_dictation().await;
                self.emit(UiEvent::InputText {
                    text: self.composer.text().to_owned(),
                });
                self.submit().await;
            }
            ComposerAction::None | ComposerAction::StartDictation => {}
        }
    }

    async fn stop_dictation(&mut self) {
        if let Err(e) = self.dictation.stop().await {
            warn!("dictation stop failed: {e:#}");
        }
        self.emit(UiEvent::MicListening { active: false });
        self.emit(UiEvent::MicLocked { locked: false });
        self.restore_idle_placeholder();
    }

    /// Drain pending dictation events from the engine channel. Hosts call
    /// this from their event loop; tests may feed events directly through
    /// [`handle_dictation_event`].
    ///
    /// [`handle_dictation_event`]: ChatController::handle_dictation_event
    pub fn pump_dictation(&mut self) {
        let Some(mut rx) = self.dictation_rx.take() else {
            return;
        };
        let mut done = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, DictationEvent::Ended | DictationEvent::Error(_)) {
                done = true;
            }
            self.handle_dictation_event(event);
        }
        if !done {
            self.dictation_rx = Some(rx);
        }
    }

    /// Apply one dictation event.
    pub fn handle_dictation_event(&mut self, event: DictationEvent) {
        match event {
            DictationEvent::Started => debug!("dictation capture live"),
            DictationEvent::Interim(text) => {
                self.composer.transcript_interim(&text);
                self.mirror_input();
            }
            DictationEvent::Final(segment) => {
                self.composer.transcript_final(&segment);
                self.mirror_input();
            }
            DictationEvent::Ended => {
                if self.composer.is_recording() {
                    // The engine wound down on its own; keep the transcript.
                    self.composer.dictation_ended();
                    self.emit(UiEvent::MicListening { active: false });
                    self.emit(UiEvent::MicLocked { locked: false });
                    self.restore_idle_placeholder();
                    self.mirror_input();
                }
                self.dictation_rx = None;
            }
            DictationEvent::Error(message) => {
                warn!("dictation error: {message}");
                if self.composer.is_recording() {
                    self.composer.dictation_error();
                    self.emit(UiEvent::MicListening { active: false });
                    self.emit(UiEvent::MicLocked { locked: false });
                    self.restore_idle_placeholder();
                }
                self.emit(UiEvent::Alert {
                    message: format!("Speech recognition error: {message}"),
                });
                self.dictation_rx = None;
            }
        }
    }

    // ── Image upload ─────────────────────────────────────────────────

    /// Upload an image and stage it for the next submission. On success
    /// the image is echoed into the transcript immediately; on failure an
    /// alert is raised and prior state is left unchanged. Uploads are
    /// independent of chat submissions and may overlap one in flight.
    pub async fn upload_image(&mut self, filename: &str, bytes: Vec<u8>) {
        info!("uploading image {filename} ({} bytes)", bytes.len());
        match self.api.upload_image(filename, bytes).await {
            Ok(upload) => {
                let src = self.api.upload_src(&upload.image_filename);
                self.pending_image = Some(upload.image_filename);
                self.conversation.push_image(src);
                self.conversation_changed();
                self.emit(UiEvent::InputPlaceholder {
                    text: IMAGE_READY_PLACEHOLDER.to_owned(),
                });
                self.emit(UiEvent::FocusInput);
            }
            Err(e) => {
                warn!("image upload failed: {e}");
                self.emit(UiEvent::Alert {
                    message: "Failed to upload image. Please try again.".to_owned(),
                });
            }
        }
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Begin a submission: validate, apply the optimistic updates, and
    /// return the request to issue. Returns `None` (and changes nothing)
    /// when the composed text is empty with no pending image, or when a
    /// submission is already in flight.
    pub fn begin_submission(&mut self) -> Option<ChatRequest> {
        if self.composer.state() == ComposerState::Submitting {
            debug!("submission already in flight; ignoring");
            return None;
        }
        let message = self.composer.text().trim().to_owned();
        if message.is_empty() && self.pending_image.is_none() {
            debug!("ignoring empty submission");
            return None;
        }

        if !message.is_empty() {
            self.conversation.push_text(Sender::User, &message);
        }
        self.conversation.begin_placeholder();
        self.conversation_changed();

        self.composer.enter_submitting();
        self.emit(UiEvent::InputText {
            text: String::new(),
        });
        self.emit(UiEvent::InputRows { rows: 1 });
        self.emit(UiEvent::InputEnabled { enabled: false });

        Some(ChatRequest {
            message,
            session_id: self.session_id.clone().unwrap_or_default(),
            image_filename: self.pending_image.clone(),
            language: self.language.clone(),
        })
    }

    /// Resolve the in-flight submission: swap the placeholder for the
    /// assistant reply, or for the fixed fallback message on failure.
    /// Either way the input is re-enabled and refocused.
    pub fn complete_submission(&mut self, result: Result<ChatReply>) {
        match result {
            Ok(reply) => {
                self.conversation.take_placeholder();
                self.conversation
                    .push_message(Sender::Assistant, &reply.response, reply.audio_url);
                self.pending_image = None;
                self.restore_idle_placeholder();
            }
            Err(e) => {
                warn!("chat request failed: {e}");
                self.conversation.take_placeholder();
                self.conversation.push_text(Sender::Assistant, FALLBACK_REPLY);
            }
        }
        self.conversation_changed();
        self.composer.finish_submission();
        self.emit(UiEvent::InputEnabled { enabled: true });
        self.emit(UiEvent::FocusInput);
    }

    /// Submit the composed message: optimistic updates, the HTTP call,
    /// and resolution. A no-op when there is nothing to send or a
    /// submission is already outstanding.
    pub async fn submit(&mut self) {
        let Some(request) = self.begin_submission() else {
            return;
        };
        let submission_id = Uuid::new_v4();
        debug!(%submission_id, "issuing chat request");
        let result = self.api.chat(&request).await;
        if result.is_ok() {
            info!(%submission_id, "chat reply received");
        }
        self.complete_submission(result);
    }

    // ── Internals ────────────────────────────────────────────────────

    fn mirror_input(&mut self) {
        self.emit(UiEvent::InputText {
            text: self.composer.text().to_owned(),
        });
        self.emit(UiEvent::InputRows {
            rows: self.composer.input_rows(),
        });
    }

    fn restore_idle_placeholder(&mut self) {
        self.emit(UiEvent::InputPlaceholder {
            text: IDLE_PLACEHOLDER.to_owned(),
        });
    }

    fn conversation_changed(&mut self) {
        self.emit(UiEvent::ConversationChanged);
        self.emit(UiEvent::ScrollToNewest);
    }

    /// Best-effort event emission; a lagging host loses render hints, not
    /// state.
    fn emit(&self, event: UiEvent) {
        if let Err(e) = self.events.try_send(event) {
            debug!("dropping UI event: {e}");
        }
    }
}
