//! Hook registration for `Veform`.
//!
//! Hooks are captured when `start()` runs; registering one afterwards does
//! not affect the session already in progress.

use std::sync::Arc;

use super::Veform;
use crate::signaling::FieldAnswer;

impl Veform {
    /// Called immediately after `start()` passes its preconditions
    pub fn on_loading_started<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_loading_started = Some(Arc::new(callback));
    }

    /// Called when the peer transport reports connectivity
    pub fn on_loading_finished<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_loading_finished = Some(Arc::new(callback));
    }

    /// Called when the server starts the conversation
    pub fn on_running_started<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_running_started = Some(Arc::new(callback));
    }

    /// Called when the conversation is complete
    pub fn on_finished<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_finished = Some(Arc::new(callback));
    }

    /// Called on recoverable errors; the session keeps running
    pub fn on_error<F>(&mut self, callback: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.handlers.on_error = Some(Arc::new(callback));
    }

    /// Called on fatal errors; the session is torn down right after
    pub fn on_critical_error<F>(&mut self, callback: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.handlers.on_critical_error = Some(Arc::new(callback));
    }

    /// Called when user speech is detected
    pub fn on_audio_in_start<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_audio_in_start = Some(Arc::new(callback));
    }

    /// Called when the user stops talking, with the recognized input
    ///
    /// Returning `true` vetoes processing of this input. The host must then
    /// call `change_field`, `emit_audio` or `interrupt` to keep the
    /// conversation going.
    pub fn on_audio_in_end<F>(&mut self, callback: F)
    where
        F: Fn(String) -> bool + Send + Sync + 'static,
    {
        self.handlers.on_audio_in_end = Some(Arc::new(callback));
    }

    /// Called before audio output starts, with the chunk descriptor
    ///
    /// Returning `true` vetoes this output; continuation is up to the host.
    pub fn on_audio_out_start<F>(&mut self, callback: F)
    where
        F: Fn(String) -> bool + Send + Sync + 'static,
    {
        self.handlers.on_audio_out_start = Some(Arc::new(callback));
    }

    pub fn on_audio_out_end<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_audio_out_end = Some(Arc::new(callback));
    }

    /// Called when focus moves between fields, with `(previous, next)` names
    ///
    /// Returning `true` vetoes the move; continuation is up to the host.
    pub fn on_focus_changed<F>(&mut self, callback: F)
    where
        F: Fn(String, String) -> bool + Send + Sync + 'static,
    {
        self.handlers.on_focus_changed = Some(Arc::new(callback));
    }

    /// Called when the server resolves an answer for a field
    pub fn on_field_value_changed<F>(&mut self, callback: F)
    where
        F: Fn(String, FieldAnswer) + Send + Sync + 'static,
    {
        self.handlers.on_field_value_changed = Some(Arc::new(callback));
    }
}
