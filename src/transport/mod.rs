//! Platform capabilities injected into a session.
//!
//! The orchestrator never touches devices or sockets directly. Capture,
//! peer connectivity, signaling, and playback are reached through the traits
//! in this module, bundled into a [`Platform`] at construction time. A
//! WebSocket signaling implementation is provided in [`websocket`]; media
//! and peer transports are supplied by the embedding application.

pub mod websocket;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::errors::TransportResult;
use crate::signaling::{IceCandidate, SessionDescription};

pub use websocket::WebSocketSignaling;

/// Capture parameters requested from the media device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConstraints {
    pub channel_count: u16,
    pub sample_rate: u32,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
}

impl Default for AudioConstraints {
    /// Mono, 48 kHz, echo cancellation and noise suppression on
    fn default() -> Self {
        Self {
            channel_count: 1,
            sample_rate: 48_000,
            echo_cancellation: true,
            noise_suppression: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A local or remote media track
pub trait MediaTrack: Send + Sync + fmt::Debug {
    fn id(&self) -> String;

    fn kind(&self) -> TrackKind;

    /// Release the underlying device; must tolerate repeated calls
    fn stop(&self);
}

/// Tracks returned by one capture request
#[derive(Debug, Clone, Default)]
pub struct MediaStream {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn get_user_media(&self, constraints: &AudioConstraints) -> TransportResult<MediaStream>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

/// Events raised by a peer connection after it is created
#[derive(Debug, Clone)]
pub enum PeerEvent {
    IceConnectionStateChanged(IceConnectionState),
    /// Locally discovered candidate to trickle to the server
    IceCandidate(IceCandidate),
    /// Remote media arrived
    Track(Arc<dyn MediaTrack>),
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn add_track(&self, track: Arc<dyn MediaTrack>) -> TransportResult<()>;

    async fn create_offer(&self) -> TransportResult<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> TransportResult<()>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> TransportResult<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> TransportResult<()>;

    /// Must tolerate an already-closed connection
    async fn close(&self);
}

/// Creates peer connections
///
/// The event receiver is returned together with the connection so that no
/// event raised during setup can be missed.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
    ) -> TransportResult<(Arc<dyn PeerConnection>, mpsc::UnboundedReceiver<PeerEvent>)>;
}

/// Inbound side of a signaling channel
#[derive(Debug, Clone, PartialEq)]
pub enum SignalingEvent {
    /// One text frame
    Message(String),
    /// Channel closed, with the peer's reason if any
    Closed(Option<String>),
    Error(String),
}

#[async_trait]
pub trait SignalingSink: Send + Sync {
    async fn send(&self, text: String) -> TransportResult<()>;

    /// Must tolerate an already-closed channel
    async fn close(&self);
}

#[async_trait]
pub trait SignalingConnector: Send + Sync {
    async fn connect(
        &self,
        url: &str,
    ) -> TransportResult<(Arc<dyn SignalingSink>, mpsc::UnboundedReceiver<SignalingEvent>)>;
}

/// Plays remote audio
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    async fn play(&self, track: Arc<dyn MediaTrack>) -> TransportResult<()>;
}

/// Capabilities a session runs on
#[derive(Clone)]
pub struct Platform {
    pub media: Arc<dyn MediaDevices>,
    pub peer: Arc<dyn PeerConnector>,
    pub signaling: Arc<dyn SignalingConnector>,
    pub playback: Arc<dyn PlaybackSink>,
}

impl Platform {
    pub fn new(
        media: Arc<dyn MediaDevices>,
        peer: Arc<dyn PeerConnector>,
        signaling: Arc<dyn SignalingConnector>,
        playback: Arc<dyn PlaybackSink>,
    ) -> Self {
        Self {
            media,
            peer,
            signaling,
            playback,
        }
    }

    /// Same as [`Platform::new`] with [`WebSocketSignaling`] as the signaling
    /// transport, closing within the configured shutdown timeout
    pub fn with_websocket_signaling(
        media: Arc<dyn MediaDevices>,
        peer: Arc<dyn PeerConnector>,
        playback: Arc<dyn PlaybackSink>,
        config: &ClientConfig,
    ) -> Self {
        let signaling = WebSocketSignaling::from_config(config);
        Self::new(media, peer, Arc::new(signaling), playback)
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
