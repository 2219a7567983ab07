//! Session loop for `Veform`.
//!
//! A single task consumes host commands, peer events and signaling frames,
//! handling each strictly in arrival order per source, and dispatches
//! server events to the host hooks.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

use super::commands::SessionCommand;
use super::connection::{close_session, send_message};
use super::handlers::EventHandlers;
use super::{SessionResources, SessionShared, SessionState};
use crate::errors::SessionError;
use crate::signaling::{IncomingMessage, OutgoingMessage};
use crate::transport::{
    IceConnectionState, PeerConnection, PeerEvent, PlaybackSink, SignalingEvent, SignalingSink,
};

pub(super) const SIGNALING_CLOSED: &str = "Signaling channel closed";
pub(super) const CONNECTION_FAILED: &str = "Connection to server failed";

enum Flow {
    Continue,
    Stop,
}

pub(super) struct EventLoop {
    pub(super) shared: Arc<SessionShared>,
    pub(super) handlers: EventHandlers,
    pub(super) resources: Arc<Mutex<SessionResources>>,
    pub(super) peer: Arc<dyn PeerConnection>,
    pub(super) signaling: Arc<dyn SignalingSink>,
    pub(super) playback: Arc<dyn PlaybackSink>,
}

impl EventLoop {
    pub(super) async fn run(
        self,
        mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
        mut peer_rx: mpsc::UnboundedReceiver<PeerEvent>,
        mut signaling_rx: mpsc::UnboundedReceiver<SignalingEvent>,
    ) {
        info!("Session {} loop started", self.shared.id);
        let mut peer_open = true;

        loop {
            let flow = tokio::select! {
                command = command_rx.recv() => match command {
                    Some(SessionCommand::Shutdown { ack_tx }) => {
                        info!("Session loop shutting down");
                        if let Some(ack_tx) = ack_tx {
                            let _ = ack_tx.send(());
                        }
                        Flow::Stop
                    }
                    Some(command) => {
                        self.handle_command(command).await;
                        Flow::Continue
                    }
                    None => Flow::Stop,
                },

                event = signaling_rx.recv() => self.handle_signaling_event(event).await,

                event = peer_rx.recv(), if peer_open => match event {
                    Some(event) => {
                        self.handle_peer_event(event).await;
                        Flow::Continue
                    }
                    None => {
                        debug!("Peer event stream ended");
                        peer_open = false;
                        Flow::Continue
                    }
                },
            };

            if let Flow::Stop = flow {
                break;
            }
        }

        info!("Session {} loop finished", self.shared.id);
    }

    async fn handle_command(&self, command: SessionCommand) {
        let Some(message) = command.into_message() else {
            return;
        };
        if let Err(e) = send_message(self.signaling.as_ref(), &message).await {
            error!("Failed to send {} command: {}", message.kind(), e);
            self.handlers.error(e.to_message());
        }
    }

    async fn handle_signaling_event(&self, event: Option<SignalingEvent>) -> Flow {
        match event {
            Some(SignalingEvent::Message(text)) => match IncomingMessage::parse(&text) {
                Ok(message) => self.dispatch(message).await,
                Err(e) => {
                    warn!("Malformed signaling message: {}", e);
                    self.handlers
                        .error(format!("Malformed signaling message: {e}"));
                    Flow::Continue
                }
            },
            Some(SignalingEvent::Error(e)) => {
                // The channel reports closure separately
                warn!("Signaling channel error: {}", e);
                Flow::Continue
            }
            Some(SignalingEvent::Closed(reason)) => {
                warn!("Signaling channel closed by server: {:?}", reason);
                self.fail(SIGNALING_CLOSED.to_string()).await
            }
            None => self.fail(SIGNALING_CLOSED.to_string()).await,
        }
    }

    async fn dispatch(&self, message: IncomingMessage) -> Flow {
        debug!("Received {} message", message.kind());

        match message {
            IncomingMessage::Answer(description) => {
                if let Err(e) = self.peer.set_remote_description(description).await {
                    error!("Failed to apply remote answer: {}", e);
                    self.handlers.error(SessionError::from(e).to_message());
                }
            }
            IncomingMessage::IceCandidate(candidate) => {
                if let Err(e) = self.peer.add_ice_candidate(candidate).await {
                    warn!("Failed to add remote candidate: {}", e);
                    self.handlers.error(SessionError::from(e).to_message());
                }
            }
            IncomingMessage::Start => {
                info!("Conversation started");
                self.shared.running.store(true, Ordering::Release);
                self.handlers.running_started();
            }
            IncomingMessage::End => {
                info!("Conversation finished");
                self.handlers.finished();
                close_session(&self.shared, &self.resources, SessionState::Ended).await;
                return Flow::Stop;
            }
            IncomingMessage::AudioOutStart(chunk) => {
                if self.handlers.audio_out_start(chunk) {
                    self.vetoed("audio output start");
                }
            }
            IncomingMessage::AudioOutEnd(_) => self.handlers.audio_out_end(),
            IncomingMessage::InputStart(_) => self.handlers.audio_in_start(),
            IncomingMessage::InputEnd(input) => {
                if self.handlers.audio_in_end(input) {
                    self.vetoed("audio input end");
                }
            }
            IncomingMessage::FocusChanged(change) => {
                if self
                    .handlers
                    .focus_changed(change.previous_name, change.next_name)
                {
                    self.vetoed("focus change");
                }
            }
            IncomingMessage::FieldResolved(resolution) => {
                self.handlers
                    .field_value_changed(resolution.field_name, resolution.answer);
            }
            IncomingMessage::Error(message) => {
                warn!("Server error: {}", message);
                self.handlers.error(message);
            }
            IncomingMessage::CriticalError(message) => {
                error!("Server critical error: {}", message);
                return self.fail(message).await;
            }
            IncomingMessage::Unknown(kind) => {
                warn!("Ignoring unknown signaling message type '{}'", kind);
            }
        }

        Flow::Continue
    }

    async fn handle_peer_event(&self, event: PeerEvent) {
        match event {
            PeerEvent::IceConnectionStateChanged(state) => match state {
                IceConnectionState::Connected | IceConnectionState::Completed => {
                    if self
                        .shared
                        .transition(SessionState::Negotiating, SessionState::Connected)
                    {
                        info!("Peer connection connected");
                        self.handlers.loading_finished();
                    }
                }
                IceConnectionState::Disconnected => info!("Peer connection disconnected"),
                IceConnectionState::Failed => {
                    error!("Peer connection failed");
                    self.handlers.error(CONNECTION_FAILED.to_string());
                }
                other => debug!("Peer connection state {:?}", other),
            },
            PeerEvent::IceCandidate(candidate) => {
                let message = OutgoingMessage::IceCandidate(candidate);
                if let Err(e) = send_message(self.signaling.as_ref(), &message).await {
                    warn!("Failed to forward local candidate: {}", e);
                    self.handlers.error(e.to_message());
                }
            }
            PeerEvent::Track(track) => {
                debug!("Remote track {} received", track.id());
                if let Err(e) = self.playback.play(track).await {
                    error!("Playback error: {}", e);
                    self.handlers.error(SessionError::from(e).to_message());
                }
            }
        }
    }

    /// Record a host veto; nothing is sent until the host issues a command
    fn vetoed(&self, event: &str) {
        info!("Host vetoed {}; awaiting host continuation", event);
        self.shared
            .awaiting_continuation
            .store(true, Ordering::Release);
    }

    /// Fire the critical-error hook and tear the session down
    async fn fail(&self, message: String) -> Flow {
        self.handlers.critical_error(message);
        close_session(&self.shared, &self.resources, SessionState::Failed).await;
        Flow::Stop
    }
}
