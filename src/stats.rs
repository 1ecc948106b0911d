//! Per-aircraft and aggregate wait-time statistics, and their report.

use std::fmt;

use crate::aircraft::AircraftResult;
use crate::types::Priority;

pub struct AircraftStats {
    pub id: String,
    pub priority: Priority,
    pub mean_wait_ms: f64,
}

pub struct SimulationStats {
    pub per_aircraft: Vec<AircraftStats>,
    pub overall_mean_wait_ms: f64,
}

impl SimulationStats {
    /// Mean wait per aircraft is `accumulated_wait_ns / route_length /
    /// 1_000_000`.
    pub fn from_results(results: &[AircraftResult]) -> Self {
        let per_aircraft: Vec<AircraftStats> = results
            .iter()
            .map(|r| {
                let route_len = r.route_len.max(1) as f64;
                let mean_wait_ms = r.total_wait.as_nanos() as f64 / route_len / 1_000_000.0;
                AircraftStats {
                    id: r.id.clone(),
                    priority: r.priority,
                    mean_wait_ms,
                }
            })
            .collect();

        let overall_mean_wait_ms = if per_aircraft.is_empty() {
            0.0
        } else {
            per_aircraft.iter().map(|a| a.mean_wait_ms).sum::<f64>() / per_aircraft.len() as f64
        };

        Self {
            per_aircraft,
            overall_mean_wait_ms,
        }
    }
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation summary ===")?;
        for aircraft in &self.per_aircraft {
            writeln!(
                f,
                "  {} (priority {}): mean wait {:.2} ms",
                aircraft.id, aircraft.priority, aircraft.mean_wait_ms
            )?;
        }
        writeln!(f, "--------------------------")?;
        writeln!(f, "  overall mean wait: {:.2} ms", self.overall_mean_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(id: &str, priority: Priority, route_len: usize, wait_ms: u64) -> AircraftResult {
        AircraftResult {
            id: id.to_string(),
            priority,
            route_len,
            total_wait: Duration::from_millis(wait_ms),
        }
    }

    #[test]
    fn mean_wait_divides_by_route_length() {
        let stats = SimulationStats::from_results(&[result("A0", 5, 2, 200)]);
        assert!((stats.per_aircraft[0].mean_wait_ms - 100.0).abs() < 1e-6);
        assert!((stats.overall_mean_wait_ms - 100.0).abs() < 1e-6);
    }

    #[test]
    fn overall_mean_averages_across_aircraft() {
        let stats = SimulationStats::from_results(&[
            result("A0", 1, 1, 100),
            result("A1", 1, 1, 300),
        ]);
        assert!((stats.overall_mean_wait_ms - 200.0).abs() < 1e-6);
    }

    #[test]
    fn empty_results_yield_zero_mean() {
        let stats = SimulationStats::from_results(&[]);
        assert_eq!(stats.overall_mean_wait_ms, 0.0);
    }
}
