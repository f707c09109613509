//! Error types for the chat client engine.

/// Top-level error type for the chat client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Dictation device or permission error.
    #[error("dictation error: {0}")]
    Dictation(String),

    /// Audio playback error.
    #[error("audio error: {0}")]
    Audio(String),

    /// HTTP transport error (the request never completed).
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend replied with a non-success status.
    #[error("api error: status {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, best effort.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Preference storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Event channel error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ClientError>;
