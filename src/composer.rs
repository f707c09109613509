//! Input acquisition and submission state machine.
//!
//! Reconciles typed text and dictated speech into a single outgoing
//! submission. Implemented as an explicit state enum plus transition
//! methods that return [`ComposerAction`]s for the controller to carry
//! out, so the hold-to-lock boundary and the submit-on-release rule are
//! testable without timers or hardware.
//!
//! Timing enters through explicit `Instant` arguments; the composer never
//! reads a clock itself.

use std::time::{Duration, Instant};

use crate::config::ComposerConfig;
use crate::dictation::TranscriptBuffer;

/// Idle input placeholder text.
pub const IDLE_PLACEHOLDER: &str = "Type your message...";
/// Placeholder while recording.
pub const LISTENING_PLACEHOLDER: &str = "Listening...";
/// Placeholder once recording has locked into hands-free capture.
pub const LOCKED_PLACEHOLDER: &str = "Locked and listening...";
/// Placeholder after a successful image upload.
pub const IMAGE_READY_PLACEHOLDER: &str = "Image uploaded. Ask me about it!";

/// Composer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    /// No text, no capture.
    Idle,
    /// Text present in the input.
    Composing,
    /// Microphone active, press still held (or treated as held).
    Recording,
    /// Microphone active and locked; capture continues after release.
    RecordingLocked,
    /// A chat request is in flight; input is disabled.
    Submitting,
}

/// What the controller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerAction {
    /// Nothing to do.
    None,
    /// Start dictation.
    StartDictation,
    /// Stop dictation without submitting.
    StopDictation,
    /// Stop dictation and submit the composed text.
    StopAndSubmit,
}

/// Input acquisition state machine.
#[derive(Debug)]
pub struct Composer {
    state: ComposerState,
    text: String,
    transcript: TranscriptBuffer,
    pressed_at: Option<Instant>,
    hold_threshold: Duration,
}

impl Composer {
    /// Create a composer with the configured hold-to-lock threshold.
    #[must_use]
    pub fn new(config: &ComposerConfig) -> Self {
        Self {
            state: ComposerState::Idle,
            text: String::new(),
            transcript: TranscriptBuffer::default(),
            pressed_at: None,
            hold_threshold: Duration::from_millis(config.hold_lock_ms),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ComposerState {
        self.state
    }

    /// Current input text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether capture is active (locked or not).
    #[must_use]
    pub fn is_recording(&self) -> bool {
        matches!(
            self.state,
            ComposerState::Recording | ComposerState::RecordingLocked
        )
    }

    /// Height hint for the input control, in rows. Grows with content,
    /// no maximum.
    #[must_use]
    pub fn input_rows(&self) -> usize {
        self.text.split('\n').count().max(1)
    }

    /// The host typed or edited the input. Ignored while a submission is
    /// in flight (the input is disabled); while recording, the dictation
    /// preview owns the input and the next event overwrites edits anyway.
    pub fn input_changed(&mut self, text: impl Into<String>) {
        if self.state == ComposerState::Submitting {
            return;
        }
        self.text = text.into();
        if matches!(self.state, ComposerState::Idle | ComposerState::Composing) {
            self.state = if self.text.is_empty() {
                ComposerState::Idle
            } else {
                ComposerState::Composing
            };
        }
    }

    /// Press on the microphone control.
    ///
    /// While a locked capture is active, a new press only resets the
    /// transcript accumulator; capture itself is not restarted.
    pub fn mic_pressed(&mut self, now: Instant) -> ComposerAction {
        match self.state {
            ComposerState::Idle | ComposerState::Composing => {
                self.transcript.clear();
                self.pressed_at = Some(now);
                self.state = ComposerState::Recording;
                ComposerAction::StartDictation
            }
            ComposerState::RecordingLocked => {
                self.transcript.clear();
                ComposerAction::None
            }
            ComposerState::Recording | ComposerState::Submitting => ComposerAction::None,
        }
    }

    /// When the current unlocked recording will lock, if one is active.
    /// Hosts schedule a timer for this instant and call [`hold_elapsed`]
    /// when it fires.
    ///
    /// [`hold_elapsed`]: Composer::hold_elapsed
    #[must_use]
    pub fn lock_deadline(&self) -> Option<Instant> {
        if self.state == ComposerState::Recording {
            self.deadline()
        } else {
            None
        }
    }

    /// The hold timer fired. Returns true if the recording locked.
    pub fn hold_elapsed(&mut self, now: Instant) -> bool {
        if self.state == ComposerState::Recording && self.deadline().is_some_and(|d| now >= d) {
            self.state = ComposerState::RecordingLocked;
            true
        } else {
            false
        }
    }

    /// Release of the microphone control.
    ///
    /// A release at or past the lock deadline is a locked release even if
    /// the host timer never fired: the lock is applied first, then the
    /// locked-release rule (stop, unlock, submit whatever text is present).
    /// An earlier release stops capture and submits only if a finalized
    /// transcript exists.
    pub fn mic_released(&mut self, now: Instant) -> ComposerAction {
        self.hold_elapsed(now);
        match self.state {
            ComposerState::RecordingLocked => {
                self.pressed_at = None;
                if !self.transcript.preview().is_empty() {
                    self.text = self.transcript.preview();
                }
                self.settle();
                ComposerAction::StopAndSubmit
            }
            ComposerState::Recording => self.release_unlocked(),
            _ => ComposerAction::None,
        }
    }

    /// Pointer left the microphone control.
    ///
    /// During an unlocked recording this is an implicit release: stop
    /// capture and submit if a finalized transcript exists. Once locked,
    /// the pointer may wander freely.
    pub fn pointer_left(&mut self, now: Instant) -> ComposerAction {
        if self.state != ComposerState::Recording {
            return ComposerAction::None;
        }
        if self.hold_elapsed(now) {
            return ComposerAction::None;
        }
        self.release_unlocked()
    }

    /// A finalized transcript segment arrived.
    pub fn transcript_final(&mut self, segment: &str) {
        self.transcript.push_final(segment);
        self.mirror_preview();
    }

    /// An interim transcript arrived.
    pub fn transcript_interim(&mut self, text: &str) {
        self.transcript.set_interim(text);
        self.mirror_preview();
    }

    /// The engine ended capture on its own (service timeout, stream
    /// closed). The finalized transcript stays in the input; nothing is
    /// submitted.
    pub fn dictation_ended(&mut self) {
        if !self.is_recording() {
            return;
        }
        self.pressed_at = None;
        if self.transcript.has_committed() {
            self.text = self.transcript.committed().to_owned();
        }
        self.settle();
    }

    /// Capture failed (device or permission error). Recording is aborted;
    /// the input text is left as-is.
    pub fn dictation_error(&mut self) {
        if !self.is_recording() {
            return;
        }
        self.pressed_at = None;
        self.settle();
    }

    /// Enter the submitting state: the input is cleared and disabled
    /// until [`finish_submission`] is called.
    ///
    /// [`finish_submission`]: Composer::finish_submission
    pub fn enter_submitting(&mut self) {
        self.text.clear();
        self.transcript.clear();
        self.pressed_at = None;
        self.state = ComposerState::Submitting;
    }

    /// The in-flight submission resolved (success or failure).
    pub fn finish_submission(&mut self) {
        if self.state == ComposerState::Submitting {
            self.state = ComposerState::Idle;
        }
    }

    /// Mirror the live transcript preview into the input text.
    fn mirror_preview(&mut self) {
        self.text = self.transcript.preview();
    }

    fn release_unlocked(&mut self) -> ComposerAction {
        self.pressed_at = None;
        if self.transcript.has_committed() {
            self.text = self.transcript.committed().to_owned();
            self.settle();
            ComposerAction::StopAndSubmit
        } else {
            self.settle();
            ComposerAction::StopDictation
        }
    }

    /// Leave any recording state for Idle/Composing based on the text.
    fn settle(&mut self) {
        self.state = if self.text.is_empty() {
            ComposerState::Idle
        } else {
            ComposerState::Composing
        };
    }

    fn deadline(&self) -> Option<Instant> {
        self.pressed_at.map(|t| t + self.hold_threshold)
    }
}
