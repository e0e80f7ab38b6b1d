//! Service and inter-arrival time distributions
//!
//! Durations are drawn from the trial's [`SimRng`] so that replays with the
//! same seed produce identical samples in identical order.

use crate::error::{validate_rate, SimResult};
use crate::randomness::SimRng;
use crate::time::saturating_units_to_duration;
use rand::Rng;
use rand_distr::Exp;
use std::time::Duration;

/// Trait for sampling service times from a distribution
pub trait ServiceTimeDistribution {
    /// Sample a duration using the trial's generator
    fn sample(&self, rng: &mut SimRng) -> Duration;

    /// Mean of the distribution in time units
    fn mean_units(&self) -> f64;
}

/// Exponential distribution with mean `1 / rate`
///
/// Used both for service times (rate = service intensity) and for
/// inter-arrival times of a Poisson arrival stream (rate = arrival rate).
#[derive(Debug, Clone, Copy)]
pub struct Exponential {
    rate: f64,
    dist: Exp<f64>,
}

impl Exponential {
    /// Create an exponential distribution with the given rate (events per time unit).
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidRate` unless the rate is positive and finite.
    pub fn new(rate: f64) -> SimResult<Self> {
        validate_rate("exponential", rate)?;
        let dist = Exp::new(rate).map_err(|e| crate::SimError::Configuration(e.to_string()))?;
        Ok(Self { rate, dist })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Draw a span in fractional time units
    pub fn sample_units(&self, rng: &mut SimRng) -> f64 {
        rng.sample(self.dist)
    }
}

impl ServiceTimeDistribution for Exponential {
    /// Draws too long to represent clamp to [`SimTime::MAX`](crate::SimTime::MAX).
    fn sample(&self, rng: &mut SimRng) -> Duration {
        saturating_units_to_duration(self.sample_units(rng))
    }

    fn mean_units(&self) -> f64 {
        1.0 / self.rate
    }
}

/// Every sample takes the same time; useful for hand-checked scenarios.
#[derive(Debug, Clone, Copy)]
pub struct ConstantServiceTime {
    service_time: Duration,
}

impl ConstantServiceTime {
    pub fn new(service_time: Duration) -> Self {
        Self { service_time }
    }
}

impl ServiceTimeDistribution for ConstantServiceTime {
    fn sample(&self, _rng: &mut SimRng) -> Duration {
        self.service_time
    }

    fn mean_units(&self) -> f64 {
        crate::time::duration_to_units(self.service_time)
    }
}
