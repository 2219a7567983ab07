//! Errors reported by the injected platform capabilities

use thiserror::Error;

/// Failures of capture devices, peer connections and signaling channels
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// Capture device denied or unavailable
    #[error("Media device error: {0}")]
    MediaDevice(String),

    /// Peer connection setup or negotiation failure
    #[error("Peer connection error: {0}")]
    PeerConnection(String),

    /// Signaling channel failure
    #[error("Signaling error: {0}")]
    Signaling(String),

    /// Remote audio could not be played
    #[error("Playback error: {0}")]
    Playback(String),

    /// The channel is already closed
    #[error("Channel closed")]
    Closed,
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;
