//! Command queue into the session loop
//!
//! Host commands are synchronous; they are queued here and written to the
//! signaling channel by the loop in order.

use tokio::sync::{mpsc, oneshot};

use crate::errors::{SessionError, SessionResult};
use crate::signaling::{ChangeFieldPayload, EmitAudioPayload, OutgoingMessage};

#[derive(Debug)]
pub(crate) enum SessionCommand {
    EmitAudio {
        content: String,
        interrupt: bool,
    },
    ChangeField {
        field_name: String,
        interrupt: bool,
    },
    Interrupt,
    /// Stop the loop
    Shutdown {
        /// Optional acknowledgement channel to signal completion
        ack_tx: Option<oneshot::Sender<()>>,
    },
}

impl SessionCommand {
    /// Wire message for host commands; `None` for `Shutdown`
    pub(crate) fn into_message(self) -> Option<OutgoingMessage> {
        match self {
            SessionCommand::EmitAudio { content, interrupt } => {
                Some(OutgoingMessage::EmitAudio(EmitAudioPayload { content, interrupt }))
            }
            SessionCommand::ChangeField {
                field_name,
                interrupt,
            } => Some(OutgoingMessage::ChangeField(ChangeFieldPayload {
                field_name,
                interrupt,
            })),
            SessionCommand::Interrupt => Some(OutgoingMessage::Interrupt),
            SessionCommand::Shutdown { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CommandQueue {
    sender: mpsc::UnboundedSender<SessionCommand>,
}

impl CommandQueue {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<SessionCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Fails with `NotRunning` once the loop has exited
    pub(crate) fn queue(&self, command: SessionCommand) -> SessionResult<()> {
        self.sender
            .send(command)
            .map_err(|_| SessionError::NotRunning)
    }
}
