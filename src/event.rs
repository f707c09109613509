//! UI events emitted by the controller for the hosting view layer.
//!
//! Intentionally lightweight (no heavy payloads) so the controller can
//! emit without blocking on a slow host; events are advisory render hints
//! and the full state is always readable from the controller itself.

use crate::theme::Theme;

/// Events that describe what the hosting view should do "right now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The transcript changed; re-render the message list.
    ConversationChanged,
    /// Scroll the message list to the newest entry.
    ScrollToNewest,
    /// Whether the input and submit controls accept interaction.
    InputEnabled {
        /// True when the user may type and submit.
        enabled: bool,
    },
    /// Replace the input text (dictation preview, transcript population,
    /// clearing on submit).
    InputText {
        /// New input contents.
        text: String,
    },
    /// Input placeholder text changed.
    InputPlaceholder {
        /// New placeholder.
        text: String,
    },
    /// Input height hint changed (grows with content).
    InputRows {
        /// Rows needed to fit the content.
        rows: usize,
    },
    /// Move keyboard focus to the input control.
    FocusInput,
    /// Microphone listening indicator.
    MicListening {
        /// True while capture is active.
        active: bool,
    },
    /// Microphone lock indicator.
    MicLocked {
        /// True while hands-free capture is locked on.
        locked: bool,
    },
    /// Theme changed; apply the palette.
    ThemeChanged(Theme),
    /// Sidebar collapsed state changed.
    SidebarChanged {
        /// True when the sidebar is collapsed.
        collapsed: bool,
    },
    /// User-visible alert (device and upload failures).
    Alert {
        /// Message to show.
        message: String,
    },
}
