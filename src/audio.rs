//! Per-message audio playback transport.
//!
//! Each assistant message with an audio reference gets its own widget,
//! built on demand and bound to one resource. Media access is an external
//! capability behind [`AudioSink`]; the host feeds time updates back into
//! the widget so the seek bar can track progress. Widgets are independent
//! of each other; nothing prevents several from playing at once.

use std::time::Duration;

use crate::error::{ClientError, Result};

/// Media transport capability for one audio resource.
///
/// Implementations wrap a platform media element or decoder; tests use a
/// recording double.
pub trait AudioSink: Send {
    /// Begin or resume playback.
    fn play(&mut self) -> anyhow::Result<()>;

    /// Pause playback, keeping the current position.
    fn pause(&mut self) -> anyhow::Result<()>;

    /// Move the playback position.
    fn seek(&mut self, position: Duration) -> anyhow::Result<()>;
}

/// Transport state of one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Not playing; position is retained.
    Paused,
    /// Actively playing.
    Playing,
}

/// Minimal transport control bound to one audio resource.
pub struct PlaybackWidget {
    url: String,
    state: TransportState,
    position: Duration,
    duration: Option<Duration>,
    sink: Box<dyn AudioSink>,
}

impl PlaybackWidget {
    /// Create a widget for the given resource, initially paused at the
    /// start.
    #[must_use]
    pub fn new(url: impl Into<String>, sink: Box<dyn AudioSink>) -> Self {
        Self {
            url: url.into(),
            state: TransportState::Paused,
            position: Duration::ZERO,
            duration: None,
            sink,
        }
    }

    /// The bound audio resource reference.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current transport state.
    #[must_use]
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Playback progress in `[0, 1]`, or 0 while the duration is unknown.
    #[must_use]
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                (self.position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Toggle between playing and paused.
    pub fn toggle(&mut self) -> Result<TransportState> {
        match self.state {
            TransportState::Paused => {
                self.sink.play().map_err(audio_error)?;
                self.state = TransportState::Playing;
            }
            TransportState::Playing => {
                self.sink.pause().map_err(audio_error)?;
                self.state = TransportState::Paused;
            }
        }
        Ok(self.state)
    }

    /// Stop: pause and rewind to the start.
    pub fn stop(&mut self) -> Result<()> {
        self.sink.pause().map_err(audio_error)?;
        self.sink.seek(Duration::ZERO).map_err(audio_error)?;
        self.position = Duration::ZERO;
        self.state = TransportState::Paused;
        Ok(())
    }

    /// Periodic time update from the sink.
    pub fn time_update(&mut self, position: Duration, duration: Duration) {
        self.position = position;
        self.duration = Some(duration);
    }

    /// Scrub to a fraction of the known duration. A scrub before any time
    /// update (duration unknown) is a no-op.
    pub fn scrub(&mut self, fraction: f64) -> Result<()> {
        let Some(duration) = self.duration else {
            return Ok(());
        };
        let fraction = fraction.clamp(0.0, 1.0);
        let target = duration.mul_f64(fraction);
        self.sink.seek(target).map_err(audio_error)?;
        self.position = target;
        Ok(())
    }
}

fn audio_error(e: anyhow::Error) -> ClientError {
    ClientError::Audio(format!("{e:#}"))
}
