//! WebSocket signaling transport
//!
//! One background task owns the socket. Outgoing frames are queued to it
//! over a channel and acknowledged once written; incoming frames are
//! forwarded as [`SignalingEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, warn};

use super::{SignalingConnector, SignalingEvent, SignalingSink};
use crate::config::{ClientConfig, DEFAULT_SHUTDOWN_TIMEOUT_MS};
use crate::errors::{TransportError, TransportResult};

enum SinkCommand {
    Send {
        text: String,
        ack_tx: oneshot::Sender<TransportResult<()>>,
    },
    Close,
}

/// [`SignalingConnector`] over `ws://` / `wss://`
///
/// `close_timeout` bounds how long closing a connected sink waits for the
/// socket task to finish.
#[derive(Debug, Clone)]
pub struct WebSocketSignaling {
    close_timeout: Duration,
}

impl Default for WebSocketSignaling {
    fn default() -> Self {
        Self {
            close_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }
}

impl WebSocketSignaling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the configured shutdown timeout as the close bound
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            close_timeout: config.shutdown_timeout(),
        }
    }

    pub fn close_timeout(&self) -> Duration {
        self.close_timeout
    }

    /// Map one socket frame to a signaling event; `None` for control frames
    fn handle_websocket_message(message: Message) -> Option<SignalingEvent> {
        match message {
            Message::Text(text) => Some(SignalingEvent::Message(text.as_str().to_owned())),
            Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                Ok(text) => Some(SignalingEvent::Message(text)),
                Err(_) => {
                    warn!("Dropping non UTF-8 binary signaling frame");
                    None
                }
            },
            Message::Close(frame) => Some(SignalingEvent::Closed(
                frame.map(|frame| frame.reason.as_str().to_owned()),
            )),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => None,
        }
    }
}

#[async_trait]
impl SignalingConnector for WebSocketSignaling {
    async fn connect(
        &self,
        url: &str,
    ) -> TransportResult<(Arc<dyn SignalingSink>, mpsc::UnboundedReceiver<SignalingEvent>)> {
        info!("Connecting signaling channel to {}", url);

        let (ws_stream, _) = connect_async(url).await.map_err(|e| {
            TransportError::Signaling(format!("Failed to connect to {url}: {e}"))
        })?;

        info!("Signaling channel connected");

        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<SinkCommand>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<SignalingEvent>();
        let (mut ws_sink, mut ws_stream) = ws_stream.split();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = command_rx.recv() => {
                        match command {
                            Some(SinkCommand::Send { text, ack_tx }) => {
                                let result = ws_sink
                                    .send(Message::Text(text.into()))
                                    .await
                                    .map_err(|e| TransportError::Signaling(format!(
                                        "Failed to send signaling message: {e}"
                                    )));
                                let failed = result.is_err();
                                let _ = ack_tx.send(result);
                                if failed {
                                    let _ = event_tx.send(SignalingEvent::Error(
                                        "Signaling send failed".to_string(),
                                    ));
                                    break;
                                }
                            }
                            Some(SinkCommand::Close) | None => {
                                debug!("Closing signaling channel");
                                if let Err(e) = ws_sink.close().await {
                                    debug!("Signaling close handshake failed: {}", e);
                                }
                                break;
                            }
                        }
                    }

                    message = ws_stream.next() => {
                        match message {
                            Some(Ok(msg)) => {
                                if let Some(event) = Self::handle_websocket_message(msg) {
                                    let closed = matches!(event, SignalingEvent::Closed(_));
                                    let _ = event_tx.send(event);
                                    if closed {
                                        break;
                                    }
                                }
                            }
                            Some(Err(e)) => {
                                error!("Signaling socket error: {}", e);
                                let _ = event_tx.send(SignalingEvent::Error(e.to_string()));
                                break;
                            }
                            None => {
                                let _ = event_tx.send(SignalingEvent::Closed(None));
                                break;
                            }
                        }
                    }
                }
            }

            info!("Signaling channel task finished");
        });

        let sink = WebSocketSink {
            command_tx,
            handle: parking_lot::Mutex::new(Some(handle)),
            close_timeout: self.close_timeout,
        };

        Ok((Arc::new(sink), event_rx))
    }
}

struct WebSocketSink {
    command_tx: mpsc::UnboundedSender<SinkCommand>,
    handle: parking_lot::Mutex<Option<JoinHandle<()>>>,
    close_timeout: Duration,
}

#[async_trait]
impl SignalingSink for WebSocketSink {
    async fn send(&self, text: String) -> TransportResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.command_tx
            .send(SinkCommand::Send { text, ack_tx })
            .map_err(|_| TransportError::Closed)?;
        ack_rx.await.map_err(|_| TransportError::Closed)?
    }

    async fn close(&self) {
        let _ = self.command_tx.send(SinkCommand::Close);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && tokio::time::timeout(self.close_timeout, handle)
                .await
                .is_err()
        {
            warn!("Signaling task did not finish after close");
        }
    }
}

impl Drop for WebSocketSink {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}
