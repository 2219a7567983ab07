//! Host hook dispatch table
//!
//! Notification hooks return nothing. Cancelable hooks return `true` to veto
//! the default follow-through of the event.

use std::fmt;
use std::sync::Arc;

use crate::signaling::FieldAnswer;

/// Hook without payload
pub type NotifyHook = Arc<dyn Fn() + Send + Sync>;

/// Hook receiving an error message
pub type ErrorHook = Arc<dyn Fn(String) + Send + Sync>;

/// Cancelable hook receiving a descriptor; `true` vetoes
pub type CancelableHook = Arc<dyn Fn(String) -> bool + Send + Sync>;

/// Cancelable hook receiving `(previous_name, next_name)`; `true` vetoes
pub type FocusChangedHook = Arc<dyn Fn(String, String) -> bool + Send + Sync>;

/// Hook receiving `(field_name, answer)`
pub type FieldValueHook = Arc<dyn Fn(String, FieldAnswer) + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventHandlers {
    pub(crate) on_loading_started: Option<NotifyHook>,
    pub(crate) on_loading_finished: Option<NotifyHook>,
    pub(crate) on_running_started: Option<NotifyHook>,
    pub(crate) on_finished: Option<NotifyHook>,
    pub(crate) on_error: Option<ErrorHook>,
    pub(crate) on_critical_error: Option<ErrorHook>,
    pub(crate) on_audio_in_start: Option<NotifyHook>,
    pub(crate) on_audio_in_end: Option<CancelableHook>,
    pub(crate) on_audio_out_start: Option<CancelableHook>,
    pub(crate) on_audio_out_end: Option<NotifyHook>,
    pub(crate) on_focus_changed: Option<FocusChangedHook>,
    pub(crate) on_field_value_changed: Option<FieldValueHook>,
}

fn notify(hook: &Option<NotifyHook>) {
    if let Some(hook) = hook {
        hook();
    }
}

impl EventHandlers {
    pub(crate) fn loading_started(&self) {
        notify(&self.on_loading_started);
    }

    pub(crate) fn loading_finished(&self) {
        notify(&self.on_loading_finished);
    }

    pub(crate) fn running_started(&self) {
        notify(&self.on_running_started);
    }

    pub(crate) fn finished(&self) {
        notify(&self.on_finished);
    }

    pub(crate) fn audio_in_start(&self) {
        notify(&self.on_audio_in_start);
    }

    pub(crate) fn audio_out_end(&self) {
        notify(&self.on_audio_out_end);
    }

    pub(crate) fn error(&self, message: String) {
        if let Some(hook) = &self.on_error {
            hook(message);
        }
    }

    pub(crate) fn critical_error(&self, message: String) {
        if let Some(hook) = &self.on_critical_error {
            hook(message);
        }
    }

    pub(crate) fn field_value_changed(&self, field_name: String, answer: FieldAnswer) {
        if let Some(hook) = &self.on_field_value_changed {
            hook(field_name, answer);
        }
    }

    /// Returns the veto; unregistered means no veto
    pub(crate) fn audio_in_end(&self, input: String) -> bool {
        self.on_audio_in_end.as_ref().is_some_and(|hook| hook(input))
    }

    pub(crate) fn audio_out_start(&self, chunk: String) -> bool {
        self.on_audio_out_start
            .as_ref()
            .is_some_and(|hook| hook(chunk))
    }

    pub(crate) fn focus_changed(&self, previous_name: String, next_name: String) -> bool {
        self.on_focus_changed
            .as_ref()
            .is_some_and(|hook| hook(previous_name, next_name))
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_loading_started", &self.on_loading_started.is_some())
            .field("on_loading_finished", &self.on_loading_finished.is_some())
            .field("on_running_started", &self.on_running_started.is_some())
            .field("on_finished", &self.on_finished.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_critical_error", &self.on_critical_error.is_some())
            .field("on_audio_in_start", &self.on_audio_in_start.is_some())
            .field("on_audio_in_end", &self.on_audio_in_end.is_some())
            .field("on_audio_out_start", &self.on_audio_out_start.is_some())
            .field("on_audio_out_end", &self.on_audio_out_end.is_some())
            .field("on_focus_changed", &self.on_focus_changed.is_some())
            .field(
                "on_field_value_changed",
                &self.on_field_value_changed.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_unregistered_hooks_are_noops() {
        let handlers = EventHandlers::default();
        handlers.loading_started();
        handlers.error("ignored".to_string());
        assert!(!handlers.audio_in_end("hello".to_string()));
        assert!(!handlers.focus_changed("a".to_string(), "b".to_string()));
    }

    #[test]
    fn test_cancelable_hook_veto() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let handlers = EventHandlers {
            on_focus_changed: Some(Arc::new(move |prev: String, next: String| {
                seen_clone.lock().push(format!("{prev}->{next}"));
                next == "blocked"
            })),
            ..Default::default()
        };

        assert!(!handlers.focus_changed("a".to_string(), "b".to_string()));
        assert!(handlers.focus_changed("b".to_string(), "blocked".to_string()));
        assert_eq!(*seen.lock(), vec!["a->b", "b->blocked"]);
    }

    #[test]
    fn test_debug_lists_registered_hooks() {
        let handlers = EventHandlers {
            on_finished: Some(Arc::new(|| {})),
            ..Default::default()
        };
        let debug = format!("{handlers:?}");
        assert!(debug.contains("on_finished: true"));
        assert!(debug.contains("on_error: false"));
    }
}
