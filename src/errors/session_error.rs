//! Session orchestrator error types
//!
//! Every failure inside the orchestrator is converted into one of these
//! values (or a hook invocation) at the public boundary.

use thiserror::Error;

use super::TransportError;

/// Session lifecycle error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The form snapshot has no fields
    #[error("No fields provided")]
    EmptyForm,

    /// `start()` was already called on this instance
    #[error("Start already called, create a new instance to run another session")]
    AlreadyStarted,

    /// `stop()` was called while no connected session exists
    #[error("Not connected to veform server")]
    NotConnected,

    /// A host command was issued without a running session loop
    #[error("Session is not running")]
    NotRunning,

    /// Capture stream could not be acquired
    #[error("Failed to acquire audio capture: {0}")]
    MediaAcquisition(String),

    /// Offer/answer or candidate negotiation failed
    #[error("Negotiation failed: {0}")]
    Negotiation(String),

    /// Signaling channel failure
    #[error("Signaling failed: {0}")]
    Signaling(String),

    /// Remote audio could not be played
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Timed out waiting on the remote side
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Outgoing message could not be serialized
    #[error("Failed to serialize message: {0}")]
    Serialization(String),
}

impl SessionError {
    /// Message forwarded to host error hooks
    pub fn to_message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::MediaDevice(msg) => SessionError::MediaAcquisition(msg),
            TransportError::PeerConnection(msg) => SessionError::Negotiation(msg),
            TransportError::Signaling(msg) => SessionError::Signaling(msg),
            TransportError::Playback(msg) => SessionError::Playback(msg),
            TransportError::Closed => SessionError::Signaling("channel closed".to_string()),
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
