//! Session setup and teardown for `Veform`.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::{Mutex, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::commands::{CommandQueue, SessionCommand};
use super::events::EventLoop;
use super::{SessionResources, SessionShared, SessionState, Veform};
use crate::errors::{SessionError, SessionResult};
use crate::signaling::OutgoingMessage;
use crate::transport::{AudioConstraints, SignalingSink};

impl Veform {
    /// Connect to the server and run the conversation
    ///
    /// Returns once the offer and the form are sent and the session loop is
    /// running; connectivity and `event-start` are reported through hooks.
    /// On failure every partially acquired resource is released, the state
    /// becomes [`SessionState::Failed`] and the critical-error hook fires.
    /// A denied or missing capture device also reaches the error hook first.
    pub async fn start(&self) -> SessionResult<()> {
        if self.form.is_empty() {
            error!("{}", SessionError::EmptyForm);
            return Err(SessionError::EmptyForm);
        }
        if self.started.swap(true, Ordering::AcqRel) {
            error!("{}", SessionError::AlreadyStarted);
            return Err(SessionError::AlreadyStarted);
        }

        info!(
            "Starting session {} with {} fields",
            self.shared.id,
            self.form.len()
        );
        self.shared.set_state(SessionState::Initializing);
        self.handlers.loading_started();

        match self.establish().await {
            Ok(()) => {
                info!("Session {} negotiation started", self.shared.id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to start session {}: {}", self.shared.id, e);
                close_session(&self.shared, &self.resources, SessionState::Failed).await;
                if let SessionError::MediaAcquisition(_) = e {
                    self.handlers.error(e.to_message());
                }
                self.handlers.critical_error(e.to_message());
                Err(e)
            }
        }
    }

    async fn establish(&self) -> SessionResult<()> {
        self.shared.set_state(SessionState::AwaitingMedia);
        let stream = self
            .platform
            .media
            .get_user_media(&AudioConstraints::default())
            .await?;
        let tracks = stream.tracks().to_vec();
        debug!("Acquired capture stream with {} tracks", tracks.len());
        self.resources.lock().await.stream = Some(stream);

        self.shared.set_state(SessionState::Negotiating);
        let (peer, peer_events) = self.platform.peer.connect().await?;
        self.resources.lock().await.peer = Some(Arc::clone(&peer));
        for track in tracks {
            peer.add_track(track).await?;
        }

        let connect_timeout = self.config.connect_timeout();
        let (signaling, signaling_events) = timeout(
            connect_timeout,
            self.platform.signaling.connect(&self.config.server_url),
        )
        .await
        .map_err(|_| {
            SessionError::Timeout(format!(
                "connecting to {} took longer than {:?}",
                self.config.server_url, connect_timeout
            ))
        })??;
        self.resources.lock().await.signaling = Some(Arc::clone(&signaling));

        let offer = peer.create_offer().await?;
        peer.set_local_description(offer.clone()).await?;

        send_message(signaling.as_ref(), &OutgoingMessage::Offer(offer)).await?;
        send_message(
            signaling.as_ref(),
            &OutgoingMessage::Form(self.form.clone()),
        )
        .await?;

        let (queue, command_rx) = CommandQueue::new();
        *self.shared.commands.write() = Some(queue);

        let event_loop = EventLoop {
            shared: Arc::clone(&self.shared),
            handlers: self.handlers.clone(),
            resources: Arc::clone(&self.resources),
            peer,
            signaling,
            playback: Arc::clone(&self.platform.playback),
        };
        let handle = tokio::spawn(event_loop.run(command_rx, peer_events, signaling_events));
        *self.loop_handle.lock() = Some(handle);

        Ok(())
    }

    /// End a connected session
    ///
    /// Stops the session loop (bounded by the configured shutdown timeout),
    /// then closes the signaling channel, the peer connection and the capture
    /// tracks in that order. Fails with [`SessionError::NotConnected`] unless
    /// the session is connected; nothing is torn down in that case.
    pub async fn stop(&self) -> SessionResult<()> {
        info!("Stop called for session {}", self.shared.id);
        if self.shared.state() != SessionState::Connected {
            error!("{}", SessionError::NotConnected);
            return Err(SessionError::NotConnected);
        }

        let shutdown_timeout = self.config.shutdown_timeout();
        let queue = self.shared.commands.read().clone();
        if let Some(queue) = queue {
            let (ack_tx, ack_rx) = oneshot::channel();
            if queue
                .queue(SessionCommand::Shutdown {
                    ack_tx: Some(ack_tx),
                })
                .is_ok()
                && timeout(shutdown_timeout, ack_rx).await.is_err()
            {
                warn!("Session loop did not acknowledge shutdown in time");
            }
        }

        let handle = self.loop_handle.lock().take();
        if let Some(mut handle) = handle
            && timeout(shutdown_timeout, &mut handle).await.is_err()
        {
            warn!("Session loop still running after shutdown; aborting");
            handle.abort();
        }

        close_session(&self.shared, &self.resources, SessionState::Ended).await;
        info!("Session {} stopped", self.shared.id);
        Ok(())
    }
}

/// Serialize and send one message
pub(super) async fn send_message(
    signaling: &dyn SignalingSink,
    message: &OutgoingMessage,
) -> SessionResult<()> {
    let text = message.to_json()?;
    debug!("Sending {} message", message.kind());
    signaling.send(text).await?;
    Ok(())
}

/// Enter `terminal` and release whatever resources are still held
///
/// Safe to call more than once; later calls find nothing left to release
/// and keep the first terminal state.
pub(super) async fn close_session(
    shared: &SessionShared,
    resources: &Mutex<SessionResources>,
    terminal: SessionState,
) {
    shared.finish(terminal);

    let (signaling, peer, stream) = {
        let mut resources = resources.lock().await;
        (
            resources.signaling.take(),
            resources.peer.take(),
            resources.stream.take(),
        )
    };

    if let Some(signaling) = signaling {
        debug!("Closing signaling channel");
        signaling.close().await;
    }
    if let Some(peer) = peer {
        debug!("Closing peer connection");
        peer.close().await;
    }
    if let Some(stream) = stream {
        debug!("Stopping capture tracks");
        stream.stop_all();
    }
}
