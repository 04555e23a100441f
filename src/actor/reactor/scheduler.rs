//! Generation-keyed timers. Scheduling or cancelling a kind bumps its
//! generation, so a token handed out earlier can never fire again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Reveal the dock on another screen after the pointer rested there.
    DelayShow,
    /// End of a monitor event burst.
    Reconcile,
    AnimationFrame,
    /// Re-check services that were unavailable.
    ServiceProbe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskToken {
    pub kind: TaskKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub token: TaskToken,
    pub delay: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    generation: u64,
    armed: bool,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    slots: HashMap<TaskKind, Slot>,
}

impl Scheduler {
    pub fn new() -> Self { Self::default() }

    /// Arms `kind`, superseding any earlier schedule of the same kind.
    pub fn schedule(&mut self, kind: TaskKind, delay: Duration) -> ScheduledTask {
        let slot = self.slots.entry(kind).or_default();
        slot.generation += 1;
        slot.armed = true;
        trace!(?kind, generation = slot.generation, ?delay, "task scheduled");
        ScheduledTask {
            token: TaskToken { kind, generation: slot.generation },
            delay,
        }
    }

    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        let slot = self.slots.entry(kind).or_default();
        if !slot.armed {
            return false;
        }
        slot.generation += 1;
        slot.armed = false;
        trace!(?kind, "task cancelled");
        true
    }

    pub fn is_armed(&self, kind: TaskKind) -> bool {
        self.slots.get(&kind).is_some_and(|s| s.armed)
    }

    /// Consumes a fired token. Returns false for superseded or cancelled
    /// tokens, which must be ignored.
    pub fn fire(&mut self, token: TaskToken) -> bool {
        match self.slots.get_mut(&token.kind) {
            Some(slot) if slot.armed && slot.generation == token.generation => {
                slot.armed = false;
                true
            }
            _ => {
                trace!(?token, "stale timer ignored");
                false
            }
        }
    }
}
