//! Per-actor task deduplication
//!
//! Advisory, in-process concurrency control: at most one generation run per
//! actor at any time. [`TaskRegistry::begin`] is an atomic check-and-insert;
//! the returned [`TaskSlot`] releases the entry on drop, so release happens
//! exactly once on every exit path, including panics inside a spawned run.
//! The guard is not a durable lock and does not survive process restart.

use crate::types::{ActorId, TaskId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of in-flight generation runs, keyed by actor
///
/// Cloneable handle; all clones share the same slot map. Per-actor slot
/// locks are created lazily and never evicted, mirroring the rate limiter.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    slots: Arc<Mutex<HashMap<ActorId, Arc<Mutex<Option<TaskId>>>>>>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the actor's slot
    ///
    /// Returns `None` without mutating state when the actor already has a
    /// run in flight; otherwise stores a fresh task id and returns the slot
    /// guard carrying it.
    pub fn begin(&self, actor: &ActorId) -> Option<TaskSlot> {
        let slot = self.slot_for(actor);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return None;
        }
        let id = TaskId::new();
        *guard = Some(id);
        drop(guard);

        Some(TaskSlot {
            registry: self.clone(),
            actor: actor.clone(),
            id,
            released: false,
        })
    }

    /// Release the actor's slot, but only if it still holds `id`
    ///
    /// The id check keeps a superseded or late release from clobbering a
    /// newer run that claimed the same actor afterwards.
    pub fn end(&self, actor: &ActorId, id: TaskId) {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(actor).cloned()
        };
        let Some(slot) = slot else {
            return;
        };
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if *guard == Some(id) {
            *guard = None;
        }
    }

    /// Whether the actor currently has a run in flight
    pub fn is_active(&self, actor: &ActorId) -> bool {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(actor).cloned()
        };
        slot.is_some_and(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
    }

    fn slot_for(&self, actor: &ActorId) -> Arc<Mutex<Option<TaskId>>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(actor.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }
}

/// RAII guard over one actor's dedup slot
///
/// Dropping the guard releases the slot (id-checked). Hold it for the whole
/// generation run so the release coincides with the run's terminal state.
pub struct TaskSlot {
    registry: TaskRegistry,
    actor: ActorId,
    id: TaskId,
    released: bool,
}

impl TaskSlot {
    /// The task id stored in the slot
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.end(&self.actor, self.id);
        }
    }
}
