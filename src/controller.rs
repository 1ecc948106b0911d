//! The banker: `Max`/`Allocation`/`Need`/`Available`, the safety check, the
//! grant/release protocol, the monitor thread, and forced-rollback
//! preemption.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::aircraft::AircraftShared;
use crate::sector::{QueueEntry, Sector, SectorState};
use crate::types::{self, AircraftIndex, Priority, SectorIndex};

/// One past the highest real priority (priorities range `[0, 1000]`),
/// used as the rollback search's "no victim yet" sentinel.
const NO_VICTIM_SENTINEL: Priority = types::MAX_PRIORITY + 1;

const MONITOR_WAKE_TIMEOUT: Duration = Duration::from_secs(5);

struct ControllerState {
    available: Vec<u8>,
    allocation: Vec<Vec<u8>>,
    need: Vec<Vec<u8>>,
}

/// Pure safety check over a snapshot of (Available, Allocation, Need).
/// Iterates aircraft in ascending index order, which keeps the search
/// deterministic and reproducible across test runs.
pub fn is_safe(available: &[u8], allocation: &[Vec<u8>], need: &[Vec<u8>]) -> bool {
    let num_aircraft = allocation.len();
    let num_sectors = available.len();
    let mut work = available.to_vec();
    let mut finish = vec![false; num_aircraft];
    let mut count = 0;

    while count < num_aircraft {
        let mut found = false;
        for p in 0..num_aircraft {
            if finish[p] {
                continue;
            }
            if (0..num_sectors).all(|j| need[p][j] <= work[j]) {
                for j in 0..num_sectors {
                    work[j] += allocation[p][j];
                }
                finish[p] = true;
                found = true;
                count += 1;
            }
        }
        if !found {
            return false;
        }
    }
    true
}

pub struct Controller {
    sectors: Vec<Sector>,
    state: Mutex<ControllerState>,
    request_cond: Condvar,
    num_aircraft: usize,
    num_sectors: usize,
    priorities: Vec<Priority>,
    max: Vec<Vec<u8>>,
}

impl Controller {
    /// `max[a][s] = 1` iff sector `s` appears in aircraft `a`'s route
    /// (I6). `Allocation` starts at zero, `Need` at `Max`, `Available` at
    /// all-ones (I7).
    pub fn new(max: Vec<Vec<u8>>, priorities: Vec<Priority>) -> Self {
        let num_aircraft = max.len();
        let num_sectors = max.first().map_or(0, |row| row.len());

        let sectors = (0..num_sectors)
            .map(|i| Sector::new(i, types::sector_id(i)))
            .collect();

        let need = max.clone();
        let allocation = vec![vec![0u8; num_sectors]; num_aircraft];
        let available = vec![1u8; num_sectors];

        Self {
            sectors,
            state: Mutex::new(ControllerState {
                available,
                allocation,
                need,
            }),
            request_cond: Condvar::new(),
            num_aircraft,
            num_sectors,
            priorities,
            max,
        }
    }

    pub fn num_sectors(&self) -> usize {
        self.num_sectors
    }

    pub fn sector(&self, index: SectorIndex) -> &Sector {
        &self.sectors[index]
    }

    /// Enqueues aircraft `a` at sector `d` and wakes the monitor.
    pub fn request(&self, a: AircraftIndex, priority: Priority, d: SectorIndex) {
        self.sectors[d].lock().enqueue(a, priority);
        self.notify_request();
    }

    fn notify_request(&self) {
        let guard = self.state.lock().expect("controller mutex poisoned");
        self.request_cond.notify_all();
        drop(guard);
    }

    /// Idempotent: re-releasing an already-released pair has no effect,
    /// which is what lets the aircraft's explicit "release o" step coexist
    /// safely with the atomic move already performed inside a preceding
    /// `try_grant`.
    pub fn release(&self, a: AircraftIndex, s: SectorIndex) {
        let mut state = self.state.lock().expect("controller mutex poisoned");
        if state.allocation[a][s] > 0 {
            state.available[s] += state.allocation[a][s];
            state.allocation[a][s] = 0;
            tracing::debug!(aircraft = a, sector = s, "released sector");
        }
        drop(state);
        self.notify_request();
    }

    /// Runs on its own thread until every aircraft has finished.
    pub fn run_monitor(&self, aircraft: &[AircraftShared]) {
        while aircraft.iter().any(|a| !a.is_finished()) {
            let state = self.state.lock().expect("controller mutex poisoned");
            let (mut state, timeout) = self
                .request_cond
                .wait_timeout(state, MONITOR_WAKE_TIMEOUT)
                .expect("controller condvar poisoned");
            if timeout.timed_out() {
                tracing::debug!("monitor wake timed out, rescanning sectors");
            }

            for sector_index in 0..self.num_sectors {
                self.process_sector(&mut state, aircraft, sector_index);
            }
        }
        tracing::info!("monitor observed all aircraft finished");
    }

    /// One pass over a single sector's queue: try each waiting aircraft
    /// head-to-tail until one can be granted safely; if none can, attempt
    /// a forced rollback using the queue head as the requester of record.
    fn process_sector(
        &self,
        state: &mut ControllerState,
        aircraft: &[AircraftShared],
        sector_index: SectorIndex,
    ) {
        let mut sector_state = self.sectors[sector_index].lock();
        if sector_state.queue().is_empty() {
            return;
        }

        let entries: Vec<QueueEntry> = sector_state.queue().to_vec();
        let mut granted = false;
        for entry in &entries {
            let origin = self.current_sector_locked(state, entry.aircraft);
            if self.try_grant(state, entry.aircraft, sector_index, origin) {
                aircraft[entry.aircraft].mark_granted(sector_index);
                tracing::info!(
                    aircraft = entry.aircraft,
                    sector = %self.sectors[sector_index].id,
                    "granted sector"
                );
                granted = true;
                break;
            }
        }

        if granted {
            self.sectors[sector_index].notify_grantable();
            return;
        }

        let head = entries[0];
        if self.attempt_rollback(state, &mut sector_state, head.aircraft, head.priority, sector_index) {
            tracing::warn!(sector = %self.sectors[sector_index].id, "forced rollback to resolve stall");
        }
    }

    fn current_sector_locked(&self, state: &ControllerState, a: AircraftIndex) -> Option<SectorIndex> {
        state.allocation[a].iter().position(|&v| v > 0)
    }

    /// Attempts to atomically move sector `d` from `a`'s `Need` into its
    /// `Allocation`, releasing origin sector `o` in the same move if given.
    /// Must be called with `sector_index` already locked by the caller (the
    /// monitor holds it throughout `process_sector`).
    fn try_grant(
        &self,
        state: &mut ControllerState,
        a: AircraftIndex,
        d: SectorIndex,
        o: Option<SectorIndex>,
    ) -> bool {
        if state.need[a][d] == 0 || state.available[d] < 1 {
            return false;
        }

        let mut tmp_available = state.available.clone();
        let mut tmp_allocation = state.allocation.clone();
        let mut tmp_need = state.need.clone();

        if let Some(o) = o {
            tmp_available[o] += 1;
            tmp_allocation[a][o] -= 1;
        }
        tmp_available[d] -= 1;
        tmp_allocation[a][d] += 1;
        tmp_need[a][d] -= 1;

        if !is_safe(&tmp_available, &tmp_allocation, &tmp_need) {
            return false;
        }

        if let Some(o) = o {
            state.available[o] += 1;
            state.allocation[a][o] -= 1;
        }
        state.available[d] -= 1;
        state.allocation[a][d] += 1;
        state.need[a][d] -= 1;
        self.debug_assert_invariants(state);
        true
    }

    /// Checked after every commit: each sector is allocated to at most one
    /// aircraft and its allocation plus its availability always sum to
    /// one, and no aircraft ever holds more than one sector at a time.
    /// Violating these would mean the protocol itself is broken, so a
    /// debug build treats it as a fatal assertion failure rather than a
    /// recoverable error.
    fn debug_assert_invariants(&self, state: &ControllerState) {
        for s in 0..self.num_sectors {
            debug_assert!(state.available[s] <= 1, "I1: available[{s}] out of range");
            let held: u32 = state.allocation.iter().map(|row| row[s] as u32).sum();
            debug_assert_eq!(
                held + state.available[s] as u32,
                1,
                "I3: sector {s} allocation + available must sum to 1"
            );
        }
        for a in 0..self.num_aircraft {
            let holding: u32 = state.allocation[a].iter().map(|&v| v as u32).sum();
            debug_assert!(holding <= 1, "I4: aircraft {a} holds more than one sector");
        }
    }

    /// Dedicated safety check for the rollback decision: clears the
    /// victim's row entirely, restores its `Need` to `Max`, then simulates
    /// granting `requested_sector` to `requester` and runs `is_safe` on
    /// the result.
    fn is_safe_after_release_total(
        &self,
        state: &ControllerState,
        victim: AircraftIndex,
        requested_sector: SectorIndex,
        requester: AircraftIndex,
    ) -> bool {
        let mut tmp_available = state.available.clone();
        let mut tmp_allocation = state.allocation.clone();
        let mut tmp_need = state.need.clone();

        for r in 0..self.num_sectors {
            let held = tmp_allocation[victim][r];
            if held > 0 {
                tmp_available[r] += held;
                tmp_allocation[victim][r] = 0;
                tmp_need[victim][r] = self.max[victim][r];
            }
        }

        if tmp_available[requested_sector] < 1 {
            return false;
        }
        tmp_available[requested_sector] -= 1;
        tmp_allocation[requester][requested_sector] += 1;
        tmp_need[requester][requested_sector] =
            self.max[requester][requested_sector] - tmp_allocation[requester][requested_sector];

        is_safe(&tmp_available, &tmp_allocation, &tmp_need)
    }

    /// Searches for the lowest-priority aircraft (ties to the lowest
    /// index) whose forced total release would let `requester` safely
    /// take `sector_index`. Returns whether a victim was found and
    /// rolled back. `sector_state` is the already-held guard for
    /// `sector_index`, reused directly when the victim's own sector
    /// happens to be the one under scan.
    fn attempt_rollback(
        &self,
        state: &mut ControllerState,
        sector_state: &mut SectorState,
        requester: AircraftIndex,
        requester_priority: Priority,
        sector_index: SectorIndex,
    ) -> bool {
        let mut victim: Option<(AircraftIndex, SectorIndex)> = None;
        let mut lowest_priority = NO_VICTIM_SENTINEL;

        for v in 0..self.num_aircraft {
            let held_sector = match state.allocation[v].iter().position(|&x| x > 0) {
                Some(r) => r,
                None => continue,
            };
            let priority = self.priorities[v];
            if priority < requester_priority
                && priority < lowest_priority
                && self.is_safe_after_release_total(state, v, sector_index, requester)
            {
                victim = Some((v, held_sector));
                lowest_priority = priority;
            }
        }

        let Some((v, r)) = victim else {
            return false;
        };

        state.allocation[v][r] -= 1;
        state.available[r] += 1;
        self.debug_assert_invariants(state);

        if r == sector_index {
            sector_state.enqueue(v, self.priorities[v]);
        } else {
            self.sectors[r].lock().enqueue(v, self.priorities[v]);
        }
        self.sectors[r].notify_grantable();
        true
    }
}
