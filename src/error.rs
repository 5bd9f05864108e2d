//! Error types for the availability engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised when callers hand the engine input it cannot work with.
///
/// These are programming errors on the caller's side (bad grid bounds, a
/// misspelled timezone). Normal gesture handling never produces them: an
/// event that cannot be resolved is ignored instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Invalid grid bounds: min hour {min_hour} must not exceed max hour {max_hour} (max 24)")]
    InvalidGridBounds { min_hour: u32, max_hour: u32 },

    #[error("Invalid day count: {0} (must be at least 1)")]
    InvalidDayCount(u32),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid timespan: end {end} must be after start {start}")]
    InvalidTimespan {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for availability operations
pub type Result<T> = std::result::Result<T, AvailabilityError>;
