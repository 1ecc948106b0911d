//! Error taxonomy.

use thiserror::Error;

/// Invalid argument counts or non-positive sizes; surfaced at startup, exit code 1.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("expected 2 arguments (num_aircraft, num_sectors), got {0}")]
    MissingArguments(usize),

    #[error("invalid integer argument {arg:?}: {source}")]
    InvalidInteger {
        arg: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("num_aircraft and num_sectors must be positive, got {num_aircraft} and {num_sectors}")]
    NonPositive { num_aircraft: i64, num_sectors: i64 },
}

/// Transient internal memory-allocation failure during queue growth.
///
/// `Vec::insert`/`Vec::retain` in `SectorState` do not fail allocation on any
/// reachable path the way the original's `realloc` could, so this variant
/// exists for completeness of the taxonomy but is never constructed. See
/// `DESIGN.md`.
#[derive(Debug, Error)]
pub enum AllocationFailure {
    #[error("failed to grow sector {sector} queue for aircraft {aircraft}")]
    QueueGrowth { sector: String, aircraft: String },
}
