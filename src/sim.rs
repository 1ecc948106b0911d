//! Orchestration entry point: wires configuration, sectors, aircraft, and
//! the monitor together and runs one end-to-end simulation. Random route
//! generation, per-step flight-time simulation, and final statistics
//! reporting all live here, alongside the CLI front-end in `main.rs`.

use std::sync::Arc;
use std::thread;

use rand::Rng;

use crate::aircraft::{self, AircraftShared};
use crate::config::Config;
use crate::controller::Controller;
use crate::route::Route;
use crate::stats::SimulationStats;
use crate::types::{self, MAX_PRIORITY, MIN_PRIORITY};

pub fn run(config: Config) -> SimulationStats {
    let mut rng = rand::thread_rng();

    let routes: Vec<Route> = (0..config.num_aircraft)
        .map(|_| Route::random(config.num_sectors, &mut rng))
        .collect();

    // Max[a][s] = 1 iff sector s appears in aircraft a's route (I6).
    let max: Vec<Vec<u8>> = routes
        .iter()
        .map(|route| {
            let mut row = vec![0u8; config.num_sectors];
            for &s in route.sectors() {
                row[s] = 1;
            }
            row
        })
        .collect();

    let priorities: Vec<_> = (0..config.num_aircraft)
        .map(|_| rng.gen_range(MIN_PRIORITY..=MAX_PRIORITY))
        .collect();

    let controller = Arc::new(Controller::new(max, priorities.clone()));
    let aircraft: Arc<Vec<AircraftShared>> = Arc::new(
        (0..config.num_aircraft)
            .map(|i| AircraftShared::new(i, types::aircraft_id(i), priorities[i]))
            .collect(),
    );

    tracing::info!(
        num_aircraft = config.num_aircraft,
        num_sectors = config.num_sectors,
        "starting simulation"
    );

    // The monitor must start before any aircraft so the first request is
    // never missed past the 5-second wake-up backstop.
    let monitor_controller = Arc::clone(&controller);
    let monitor_aircraft = Arc::clone(&aircraft);
    let monitor = thread::spawn(move || {
        monitor_controller.run_monitor(&monitor_aircraft);
    });

    let handles: Vec<_> = routes
        .into_iter()
        .enumerate()
        .map(|(i, route)| {
            let controller = Arc::clone(&controller);
            let aircraft = Arc::clone(&aircraft);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                aircraft::run(&controller, &aircraft[i], route, &mut rng)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("aircraft thread panicked"))
        .collect();

    monitor.join().expect("monitor thread panicked");

    tracing::info!("simulation complete");
    SimulationStats::from_results(&results)
}
