//! Aggregation of per-trial values

use serde::{Deserialize, Serialize};

/// Descriptive statistics of a set of per-trial measurements
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Number of samples
    pub count: usize,
}

impl Summary {
    /// Summarise `samples`; an empty slice yields the all-zero summary.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = samples
            .iter()
            .map(|value| {
                let diff = value - mean;
                diff * diff
            })
            .sum::<f64>()
            / count as f64;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            count,
        }
    }

    /// Summarise the trials that produced a value, skipping the rest.
    pub fn from_optional(samples: impl IntoIterator<Item = Option<f64>>) -> Self {
        let present: Vec<f64> = samples.into_iter().flatten().collect();
        Self::from_samples(&present)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
