//! Error types for the simulation framework

use thiserror::Error;

/// Construction-time errors.
///
/// The engine itself has no recoverable runtime errors: a process that asks
/// for a negative delay or releases a slot it does not hold is a defect and
/// panics. Everything here is raised before a trial starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("Rate of '{name}' must be positive and finite, got {rate}")]
    InvalidRate { name: String, rate: f64 },

    #[error("Capacity of '{name}' must be at least 1 or unbounded")]
    InvalidCapacity { name: String },

    #[error("Probability '{name}' must lie in [0, 1], got {value}")]
    InvalidProbability { name: String, value: f64 },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Unknown server: {0}")]
    UnknownServer(String),
}

/// Convenience alias used across the workspace
pub type SimResult<T> = Result<T, SimError>;

/// Reject non-positive or non-finite rates.
pub fn validate_rate(name: &str, rate: f64) -> SimResult<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidRate {
            name: name.to_string(),
            rate,
        })
    }
}

/// Reject probabilities outside `[0, 1]` (NaN included).
pub fn validate_probability(name: &str, value: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidProbability {
            name: name.to_string(),
            value,
        })
    }
}
