//! Error types for the wisp daemon.

use wisp_rpc::Message;

/// Errors that can occur in the daemon
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] wisp_core::Error),

    /// Frame error
    #[error("Frame error: {0}")]
    Frame(#[from] wisp_rpc::FrameError),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Method not found
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Action id unknown or evicted
    #[error("Action not found: {0}")]
    ActionNotFound(String),

    /// A UI session is already attached
    #[error("Another UI session is active")]
    SessionRejected,

    /// File watcher error
    #[error("Watcher error: {0}")]
    Watcher(#[from] notify::Error),
}

impl DaemonError {
    /// Classify a core error, lifting the variants the UI cares about.
    #[must_use]
    pub fn from_core(err: wisp_core::Error) -> Self {
        match err {
            wisp_core::Error::ActionNotFound(id) => DaemonError::ActionNotFound(id),
            other => DaemonError::Core(other),
        }
    }

    /// Failure response to `request` carrying this error's message.
    #[must_use]
    pub fn to_response(&self, request: &Message) -> Message {
        Message::failure(request, self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DaemonError>;
