//! Field behaviors and the event → behavior map
//!
//! Behaviors are advisory instructions sent to the server together with the
//! form. Nothing here is executed locally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Conversation-time triggers evaluated by the server against a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ValidAnswer,
    InvalidAnswer,
    MoveRequested,
    EndRequested,
    ValidYesAnswer,
    ValidNoAnswer,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::ValidAnswer,
        EventKind::InvalidAnswer,
        EventKind::MoveRequested,
        EventKind::EndRequested,
        EventKind::ValidYesAnswer,
        EventKind::ValidNoAnswer,
    ];
}

/// Behavior directive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BehaviorKind {
    /// Move conversational focus to another field
    MoveTo,
    /// Produce an output (text or template)
    Output,
}

/// A directive attached to a (field, event) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behavior {
    #[serde(rename = "type")]
    pub kind: BehaviorKind,
    /// Target field, required for [`BehaviorKind::MoveTo`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_to_field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}

impl Behavior {
    /// Move focus to `field_name`
    pub fn move_to(field_name: impl Into<String>) -> Self {
        Self {
            kind: BehaviorKind::MoveTo,
            move_to_field_name: Some(field_name.into()),
            output: None,
            modifier: None,
        }
    }

    /// Speak `output` to the user
    pub fn output(output: impl Into<String>) -> Self {
        Self {
            kind: BehaviorKind::Output,
            move_to_field_name: None,
            output: Some(output.into()),
            modifier: None,
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = Some(modifier.into());
        self
    }

    pub fn is_move_to(&self) -> bool {
        self.kind == BehaviorKind::MoveTo
    }

    /// MoveTo target when this is a well-formed MoveTo behavior
    pub fn move_target(&self) -> Option<&str> {
        match self.kind {
            BehaviorKind::MoveTo => self
                .move_to_field_name
                .as_deref()
                .filter(|name| !name.is_empty()),
            BehaviorKind::Output => None,
        }
    }

    /// Reason this behavior cannot be attached, if any
    pub(crate) fn problem(&self) -> Option<&'static str> {
        match self.kind {
            BehaviorKind::MoveTo if self.move_target().is_none() => {
                Some("moveTo behavior requires a target field name")
            }
            _ => None,
        }
    }
}

/// Ordered behavior lists keyed by event kind
///
/// At most one MoveTo behavior exists per event; a second MoveTo replaces the
/// first in place. Output behaviors accumulate in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventConfig(BTreeMap<EventKind, Vec<Behavior>>);

impl EventConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a behavior; returns false when the behavior is malformed
    pub fn add(&mut self, event: EventKind, behavior: Behavior) -> bool {
        if behavior.problem().is_some() {
            return false;
        }

        let behaviors = self.0.entry(event).or_default();
        if behavior.is_move_to()
            && let Some(existing) = behaviors.iter_mut().find(|b| b.is_move_to())
        {
            *existing = behavior;
            return true;
        }

        behaviors.push(behavior);
        true
    }

    /// Behaviors registered for `event`, in insertion order
    pub fn behaviors(&self, event: EventKind) -> &[Behavior] {
        self.0.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every behavior registered for `event`
    pub fn clear(&mut self, event: EventKind) -> Vec<Behavior> {
        self.0.remove(&event).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventKind, &[Behavior])> {
        self.0.iter().map(|(kind, list)| (*kind, list.as_slice()))
    }

    /// Normalize a deserialized map so the MoveTo invariant holds
    pub(crate) fn normalized(self) -> Result<Self, &'static str> {
        let mut out = EventConfig::new();
        for (event, behaviors) in self.0 {
            for behavior in behaviors {
                if let Some(problem) = behavior.problem() {
                    return Err(problem);
                }
                out.add(event, behavior);
            }
        }
        Ok(out)
    }
}
