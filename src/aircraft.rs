//! The aircraft activity: per-route-step request/wait/acquire/hold state
//! machine, run on its own OS thread.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::controller::Controller;
use crate::route::Route;
use crate::types::{AircraftIndex, Priority, SectorIndex};

const FLIGHT_TIME_MIN_MS: u64 = 300;
const FLIGHT_TIME_MAX_MS: u64 = 800;

#[derive(Default)]
struct AircraftInner {
    granted: Option<SectorIndex>,
    finished: bool,
}

/// State shared between an aircraft's own thread and the monitor thread.
///
/// `inner` sits at the bottom of the lock hierarchy: the monitor only ever
/// locks it after `controller_mutex` then `sector_mutex[s]`, strictly
/// downward, while the aircraft's own thread locks it while holding only
/// `sector_mutex[d]`. `granted` is this crate's race-free stand-in for the
/// aircraft polling `Allocation[a][d]` directly — reading the controller's
/// matrices would require holding `controller_mutex` from inside the
/// sector wait, which the hierarchy forbids. The monitor sets the flag at
/// the same moment it commits the grant to `Allocation`; the aircraft's
/// wait predicate polls only this flag, guarded by its own mutex.
pub struct AircraftShared {
    pub index: AircraftIndex,
    pub id: String,
    pub priority: Priority,
    inner: Mutex<AircraftInner>,
}

impl AircraftShared {
    pub fn new(index: AircraftIndex, id: String, priority: Priority) -> Self {
        Self {
            index,
            id,
            priority,
            inner: Mutex::new(AircraftInner::default()),
        }
    }

    /// Called by the monitor once a grant for `sector` has been committed.
    pub fn mark_granted(&self, sector: SectorIndex) {
        self.inner.lock().expect("aircraft mutex poisoned").granted = Some(sector);
    }

    /// Non-consuming peek, used as the sector's `Condvar::wait_while`
    /// predicate.
    fn has_grant(&self, sector: SectorIndex) -> bool {
        self.inner.lock().expect("aircraft mutex poisoned").granted == Some(sector)
    }

    /// Consumes the grant once this aircraft's thread has woken and
    /// re-acquired the sector mutex (the "Acquire phase").
    fn take_grant(&self, sector: SectorIndex) -> bool {
        let mut inner = self.inner.lock().expect("aircraft mutex poisoned");
        if inner.granted == Some(sector) {
            inner.granted = None;
            true
        } else {
            false
        }
    }

    pub fn mark_finished(&self) {
        self.inner.lock().expect("aircraft mutex poisoned").finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.inner.lock().expect("aircraft mutex poisoned").finished
    }
}

/// Per-aircraft outcome fed into `stats::SimulationStats`.
pub struct AircraftResult {
    pub id: String,
    pub priority: Priority,
    pub route_len: usize,
    pub total_wait: Duration,
}

/// Request/wait/acquire for sector `d`, given the sector currently held
/// (`origin`, if any). Returns the time spent waiting. Also issues the
/// explicit release of `origin` (idempotent no-op when `try_grant`'s
/// atomic move already released it).
fn traverse_step(
    controller: &Controller,
    shared: &AircraftShared,
    origin: Option<SectorIndex>,
    d: SectorIndex,
) -> Duration {
    controller.request(shared.index, shared.priority, d);

    let wait_start = Instant::now();
    let sector = controller.sector(d);
    let guard = sector.lock();
    let mut guard = sector.wait_while(guard, |_state| !shared.has_grant(d));
    let wait_time = wait_start.elapsed();

    let granted = shared.take_grant(d);
    debug_assert!(granted, "woke from grantable condvar without a recorded grant");

    guard.remove(shared.index);
    drop(guard);

    if let Some(o) = origin {
        controller.release(shared.index, o);
    }

    wait_time
}

fn simulate_flight(rng: &mut impl Rng) {
    let millis = rng.gen_range(FLIGHT_TIME_MIN_MS..=FLIGHT_TIME_MAX_MS);
    std::thread::sleep(Duration::from_millis(millis));
}

/// Runs one aircraft's full route to completion on the calling thread.
pub fn run(
    controller: &Controller,
    shared: &AircraftShared,
    mut route: Route,
    rng: &mut impl Rng,
) -> AircraftResult {
    let route_len = route.len();
    let mut origin: Option<SectorIndex> = None;
    let mut total_wait = Duration::ZERO;

    while let Some(d) = route.next() {
        tracing::info!(aircraft = %shared.id, sector = d, priority = shared.priority, "requesting sector");
        total_wait += traverse_step(controller, shared, origin, d);
        tracing::info!(aircraft = %shared.id, sector = d, "entered sector");
        origin = Some(d);
        simulate_flight(rng);
    }

    if let Some(o) = origin {
        controller.release(shared.index, o);
    }
    shared.mark_finished();
    tracing::info!(aircraft = %shared.id, "route complete");

    AircraftResult {
        id: shared.id.clone(),
        priority: shared.priority,
        route_len,
        total_wait,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_flag_round_trips_through_peek_and_take() {
        let shared = AircraftShared::new(0, "A0".to_string(), 5);
        assert!(!shared.has_grant(2));
        shared.mark_granted(2);
        assert!(shared.has_grant(2));
        assert!(shared.take_grant(2));
        assert!(!shared.has_grant(2));
        assert!(!shared.take_grant(2));
    }

    #[test]
    fn finished_flag_starts_false_and_latches_true() {
        let shared = AircraftShared::new(0, "A0".to_string(), 5);
        assert!(!shared.is_finished());
        shared.mark_finished();
        assert!(shared.is_finished());
    }
}
