// ledger.rs - Entity id allocation and the pending-destruction queue
//
// Both pieces of state share one lock. These are the only factory operations
// that may run off the owning thread, and each critical section is a single
// increment or a single push/swap.

use crate::ecs::Entity;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::mem;

#[derive(Debug, Default)]
struct LedgerState {
    last_id: u32,
    pending: VecDeque<Entity>,
}

/// Thread-safe id generator and destruction queue.
#[derive(Debug, Default)]
pub struct EntityLedger {
    state: Mutex<LedgerState>,
}

impl EntityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh entity id.
    ///
    /// # Panics
    /// Panics when the id space is exhausted. Wrapping back to the null id
    /// would hand out ids that alias live entities.
    pub fn allocate(&self) -> Entity {
        let mut state = self.state.lock();
        let next = state.last_id.wrapping_add(1);
        if next == Entity::NULL.id() {
            panic!("Overflow on Entity generation.");
        }
        state.last_id = next;
        Entity::from_raw(next)
    }

    /// Append `entity` to the pending-destruction queue. Null is ignored.
    pub fn queue_for_destruction(&self, entity: Entity) {
        if entity.is_null() {
            return;
        }
        self.state.lock().pending.push_back(entity);
    }

    /// Swap the pending queue with an empty one and return the old batch.
    ///
    /// Entities queued after the swap land in the next batch.
    pub fn take_pending(&self) -> VecDeque<Entity> {
        mem::take(&mut self.state.lock().pending)
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    #[cfg(test)]
    pub(crate) fn starting_after(last_id: u32) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                last_id,
                pending: VecDeque::new(),
            }),
        }
    }
}
