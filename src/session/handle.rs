//! Cloneable handle onto a session

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::debug;

use super::commands::SessionCommand;
use super::{SessionShared, SessionState};
use crate::errors::{SessionError, SessionResult};

/// Shared view of a session for hooks and other tasks
///
/// Issuing any command clears the awaiting-continuation flag left by a
/// vetoed cancelable event.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) shared: Arc<SessionShared>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.shared.id
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// `event-start` was received and the session has not ended
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// A cancelable event was vetoed and no host command has followed yet
    pub fn is_awaiting_continuation(&self) -> bool {
        self.shared.awaiting_continuation.load(Ordering::Acquire)
    }

    /// Ask the server to speak `content`, pre-empting current output when
    /// `interrupt` is set and queuing behind it otherwise
    pub fn emit_audio(&self, content: impl Into<String>, interrupt: bool) -> SessionResult<()> {
        self.send_command(SessionCommand::EmitAudio {
            content: content.into(),
            interrupt,
        })
    }

    /// Ask the server to move focus to `field_name`
    pub fn change_field(
        &self,
        field_name: impl Into<String>,
        interrupt: bool,
    ) -> SessionResult<()> {
        self.send_command(SessionCommand::ChangeField {
            field_name: field_name.into(),
            interrupt,
        })
    }

    /// Ask the server to halt current audio output
    pub fn interrupt(&self) -> SessionResult<()> {
        self.send_command(SessionCommand::Interrupt)
    }

    fn send_command(&self, command: SessionCommand) -> SessionResult<()> {
        let queue = self
            .shared
            .commands
            .read()
            .clone()
            .ok_or(SessionError::NotRunning)?;

        debug!("Queueing host command {:?}", command);
        queue.queue(command)?;
        self.shared
            .awaiting_continuation
            .store(false, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.shared.id)
            .field("state", &self.shared.state())
            .finish()
    }
}
