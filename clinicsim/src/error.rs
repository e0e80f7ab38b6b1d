//! Errors of the experiment layer

use clinic_core::SimError;
use clinic_metrics::MetricsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Simulation(#[from] SimError),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExperimentResult<T> = Result<T, ExperimentError>;
