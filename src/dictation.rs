//! Dictation capability interface and transcript accumulation.
//!
//! Speech capture is an external capability. The engine contract is kept
//! narrow (start/stop plus an event stream) so the composer state machine
//! can be exercised without real hardware.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Events emitted by a dictation engine during one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationEvent {
    /// Capture started and the device is live.
    Started,
    /// Provisional transcript for the in-progress utterance. Each event
    /// carries the full current interim text and replaces the previous one.
    Interim(String),
    /// Finalized transcript segment, appended to the committed transcript.
    Final(String),
    /// Capture ended (stopped, or the engine wound down on its own).
    Ended,
    /// Device or permission failure; capture is no longer active.
    Error(String),
}

/// Dictation engine contract. Real engines wrap a platform speech API;
/// tests use a scripted double.
#[async_trait]
pub trait DictationEngine: Send + Sync {
    /// Begin capture in the given locale, delivering events to `events`.
    async fn start(
        &mut self,
        locale: &str,
        events: mpsc::Sender<DictationEvent>,
    ) -> anyhow::Result<()>;

    /// Stop capture. Implementations emit [`DictationEvent::Ended`] once
    /// capture has wound down.
    async fn stop(&mut self) -> anyhow::Result<()>;
}

/// Engine for hosts without a speech capability; starting always fails,
/// which surfaces the standard device-error path.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDictation;

#[async_trait]
impl DictationEngine for UnsupportedDictation {
    async fn start(
        &mut self,
        _locale: &str,
        _events: mpsc::Sender<DictationEvent>,
    ) -> anyhow::Result<()> {
        anyhow::bail!("speech recognition is not available on this host")
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Accumulates finalized and interim transcript segments during one capture.
///
/// Finalized segments are committed with a trailing space; interim text is
/// transient and replaced wholesale by each interim event.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    committed: String,
    interim: String,
}

impl TranscriptBuffer {
    /// Discard all accumulated text.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.interim.clear();
    }

    /// Commit a finalized segment.
    pub fn push_final(&mut self, segment: &str) {
        self.committed.push_str(segment);
        self.committed.push(' ');
        self.interim.clear();
    }

    /// Replace the interim text.
    pub fn set_interim(&mut self, text: &str) {
        self.interim.clear();
        self.interim.push_str(text);
    }

    /// Committed plus interim text, as shown in the input while recording.
    #[must_use]
    pub fn preview(&self) -> String {
        format!("{}{}", self.committed, self.interim)
    }

    /// Finalized text only.
    #[must_use]
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Whether any finalized text has been committed.
    #[must_use]
    pub fn has_committed(&self) -> bool {
        !self.committed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn finals_accumulate_with_trailing_spaces() {
        let mut buffer = TranscriptBuffer::default();
        buffer.push_final("hello");
        buffer.push_final("world");
        assert_eq!(buffer.committed(), "hello world ");
        assert!(buffer.has_committed());
    }

    #[test]
    fn preview_combines_committed_and_interim() {
        let mut buffer = TranscriptBuffer::default();
        buffer.push_final("hello");
        buffer.set_interim("wor");
        assert_eq!(buffer.preview(), "hello wor");
    }

    #[test]
    fn interim_is_replaced_not_appended() {
        let mut buffer = TranscriptBuffer::default();
        buffer.set_interim("he");
        buffer.set_interim("hel");
        assert_eq!(buffer.preview(), "hel");
        assert!(!buffer.has_committed());
    }

    #[test]
    fn final_clears_interim() {
        let mut buffer = TranscriptBuffer::default();
        buffer.set_interim("hello");
        buffer.push_final("hello");
        assert_eq!(buffer.preview(), "hello ");
    }

    #[test]
    fn clear_resets_everything() {
        let mut buffer = TranscriptBuffer::default();
        buffer.push_final("hello");
        buffer.set_interim("there");
        buffer.clear();
        assert_eq!(buffer.preview(), "");
        assert!(!buffer.has_committed());
    }

    #[tokio::test]
    async fn unsupported_engine_refuses_to_start() {
        let (tx, _rx) = mpsc::channel(4);
        let mut engine = UnsupportedDictation;
        assert!(engine.start("en-US", tx).await.is_err());
        assert!(engine.stop().await.is_ok());
    }
}
