//! Session orchestrator.
//!
//! `Veform` drives one conversation from setup to teardown: it acquires the
//! capture stream, negotiates the peer connection over the signaling
//! channel, hands the form to the server and dispatches server events to the
//! registered host hooks. The work is split across focused submodules:
//!
//! - `callbacks`: `on_*` hook registration
//! - `connection`: `start()` / `stop()` and resource teardown
//! - `events`: the session loop and event dispatch
//! - `commands`: host command queue
//! - `handle`: [`SessionHandle`] for hooks and other tasks

mod callbacks;
mod commands;
mod connection;
mod events;
mod handle;
mod handlers;


use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex as SyncMutex, RwLock};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::form::Form;
use crate::transport::{MediaStream, PeerConnection, Platform, SignalingSink};

use commands::CommandQueue;

pub use handle::SessionHandle;
pub use handlers::{
    CancelableHook, ErrorHook, EventHandlers, FieldValueHook, FocusChangedHook, NotifyHook,
};

/// Lifecycle of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Initializing,
    AwaitingMedia,
    Negotiating,
    Connected,
    Ended,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Ended | SessionState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Initializing => "initializing",
            SessionState::AwaitingMedia => "awaiting-media",
            SessionState::Negotiating => "negotiating",
            SessionState::Connected => "connected",
            SessionState::Ended => "ended",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State visible to the loop, the handle and the orchestrator
pub(crate) struct SessionShared {
    pub(crate) id: String,
    state: RwLock<SessionState>,
    pub(crate) running: AtomicBool,
    pub(crate) awaiting_continuation: AtomicBool,
    pub(crate) commands: RwLock<Option<CommandQueue>>,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: RwLock::new(SessionState::Idle),
            running: AtomicBool::new(false),
            awaiting_continuation: AtomicBool::new(false),
            commands: RwLock::new(None),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub(crate) fn set_state(&self, next: SessionState) {
        let previous = std::mem::replace(&mut *self.state.write(), next);
        if previous != next {
            debug!("Session {}: {} -> {}", self.id, previous, next);
        }
    }

    /// Move to `next` only from `from`; returns whether it moved
    pub(crate) fn transition(&self, from: SessionState, next: SessionState) -> bool {
        let mut state = self.state.write();
        if *state != from {
            return false;
        }
        *state = next;
        debug!("Session {}: {} -> {}", self.id, from, next);
        true
    }

    /// Enter a terminal state unless one was already reached
    pub(crate) fn finish(&self, terminal: SessionState) {
        let mut state = self.state.write();
        if state.is_terminal() {
            return;
        }
        debug!("Session {}: {} -> {}", self.id, *state, terminal);
        *state = terminal;
        self.running.store(false, Ordering::Release);
        self.awaiting_continuation.store(false, Ordering::Release);
        self.commands.write().take();
    }
}

/// Resources owned by one session, released in reverse acquisition order
#[derive(Default)]
pub(crate) struct SessionResources {
    pub(crate) stream: Option<MediaStream>,
    pub(crate) peer: Option<Arc<dyn PeerConnection>>,
    pub(crate) signaling: Option<Arc<dyn SignalingSink>>,
}

/// Orchestrates one voice form conversation
///
/// One instance runs at most one session. Register hooks with the `on_*`
/// methods, then call [`Veform::start`].
pub struct Veform {
    pub(crate) form: Form,
    pub(crate) platform: Platform,
    pub(crate) config: ClientConfig,
    pub(crate) handlers: EventHandlers,
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) started: AtomicBool,
    pub(crate) resources: Arc<Mutex<SessionResources>>,
    pub(crate) loop_handle: SyncMutex<Option<JoinHandle<()>>>,
}

impl Veform {
    /// Create an orchestrator for `form`; accepts a `Form` or a `FormBuilder`
    ///
    /// A plain list of fields goes through `Form::try_from` first.
    pub fn new(form: impl Into<Form>, platform: Platform, config: ClientConfig) -> Self {
        Self {
            form: form.into(),
            platform,
            config,
            handlers: EventHandlers::default(),
            shared: Arc::new(SessionShared::new()),
            started: AtomicBool::new(false),
            resources: Arc::new(Mutex::new(SessionResources::default())),
            loop_handle: SyncMutex::new(None),
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.shared.id
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn is_awaiting_continuation(&self) -> bool {
        self.shared.awaiting_continuation.load(Ordering::Acquire)
    }

    /// Cloneable handle for hooks and other tasks
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// See [`SessionHandle::emit_audio`]
    pub fn emit_audio(
        &self,
        content: impl Into<String>,
        interrupt: bool,
    ) -> crate::errors::SessionResult<()> {
        self.handle().emit_audio(content, interrupt)
    }

    /// See [`SessionHandle::change_field`]
    pub fn change_field(
        &self,
        field_name: impl Into<String>,
        interrupt: bool,
    ) -> crate::errors::SessionResult<()> {
        self.handle().change_field(field_name, interrupt)
    }

    /// See [`SessionHandle::interrupt`]
    pub fn interrupt(&self) -> crate::errors::SessionResult<()> {
        self.handle().interrupt()
    }
}

impl fmt::Debug for Veform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Veform")
            .field("session_id", &self.shared.id)
            .field("state", &self.shared.state())
            .field("fields", &self.form.len())
            .field("handlers", &self.handlers)
            .finish()
    }
}

impl Drop for Veform {
    fn drop(&mut self) {
        if let Some(handle) = self.loop_handle.lock().take()
            && !handle.is_finished()
        {
            warn!(
                "Veform session {} dropped without stop(); aborting session loop",
                self.shared.id
            );
            handle.abort();
        }
    }
}
