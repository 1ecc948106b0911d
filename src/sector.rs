//! A single-instance resource fronted by a priority-ordered waiting queue
//! and a "this sector may now be grantable" condition variable.
//!
//! The queue is weakly decreasing in priority from head to tail, with
//! FIFO order preserved among equal-priority entries.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::types::{AircraftIndex, Priority, SectorIndex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub aircraft: AircraftIndex,
    pub priority: Priority,
}

#[derive(Default)]
pub struct SectorState {
    queue: Vec<QueueEntry>,
}

impl SectorState {
    pub fn queue(&self) -> &[QueueEntry] {
        &self.queue
    }

    /// Inserts at the highest index `i` such that `priority > queue[i].priority`,
    /// appending if no such index exists. Equal-priority entries keep FIFO order.
    pub fn enqueue(&mut self, aircraft: AircraftIndex, priority: Priority) {
        let pos = self
            .queue
            .iter()
            .position(|entry| priority > entry.priority)
            .unwrap_or(self.queue.len());
        self.queue.insert(pos, QueueEntry { aircraft, priority });
    }

    /// Removing an absent aircraft is a no-op.
    pub fn remove(&mut self, aircraft: AircraftIndex) {
        self.queue.retain(|entry| entry.aircraft != aircraft);
    }

    pub fn head(&self) -> Option<QueueEntry> {
        self.queue.first().copied()
    }

    pub fn is_weakly_decreasing(&self) -> bool {
        self.queue.windows(2).all(|w| w[0].priority >= w[1].priority)
    }
}

pub struct Sector {
    pub index: SectorIndex,
    pub id: String,
    state: Mutex<SectorState>,
    grantable: Condvar,
}

impl Sector {
    pub fn new(index: SectorIndex, id: String) -> Self {
        Self {
            index,
            id,
            state: Mutex::new(SectorState::default()),
            grantable: Condvar::new(),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, SectorState> {
        self.state.lock().expect("sector mutex poisoned")
    }

    /// Blocks on the "grantable" condition while `predicate` holds — the
    /// aircraft's wait phase, re-checked atomically on every wake-up.
    pub fn wait_while<'a>(
        &'a self,
        guard: MutexGuard<'a, SectorState>,
        mut predicate: impl FnMut(&SectorState) -> bool,
    ) -> MutexGuard<'a, SectorState> {
        self.grantable
            .wait_while(guard, |state| predicate(state))
            .expect("sector condvar poisoned")
    }

    pub fn notify_grantable(&self) {
        self.grantable.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_keeps_weakly_decreasing_priority() {
        let mut state = SectorState::default();
        state.enqueue(0, 5);
        state.enqueue(1, 10);
        state.enqueue(2, 5);
        state.enqueue(3, 1);
        state.enqueue(4, 10);
        assert!(state.is_weakly_decreasing());
        // FIFO within a priority class: aircraft 1 arrived before aircraft 4.
        let prio10: Vec<_> = state.queue().iter().filter(|e| e.priority == 10).collect();
        assert_eq!(prio10[0].aircraft, 1);
        assert_eq!(prio10[1].aircraft, 4);
        // FIFO within priority 5: aircraft 0 before aircraft 2.
        let prio5: Vec<_> = state.queue().iter().filter(|e| e.priority == 5).collect();
        assert_eq!(prio5[0].aircraft, 0);
        assert_eq!(prio5[1].aircraft, 2);
    }

    #[test]
    fn head_is_highest_priority_entry() {
        let mut state = SectorState::default();
        state.enqueue(0, 3);
        state.enqueue(1, 9);
        assert_eq!(state.head().unwrap().aircraft, 1);
    }

    #[test]
    fn remove_absent_aircraft_is_noop() {
        let mut state = SectorState::default();
        state.enqueue(0, 1);
        state.remove(42);
        assert_eq!(state.queue().len(), 1);
    }

    #[test]
    fn remove_present_aircraft_shrinks_queue() {
        let mut state = SectorState::default();
        state.enqueue(0, 1);
        state.enqueue(1, 2);
        state.remove(0);
        assert_eq!(state.queue().len(), 1);
        assert_eq!(state.head().unwrap().aircraft, 1);
    }
}
