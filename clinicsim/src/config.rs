//! Experiment configuration
//!
//! A [`ClinicConfig`] holds everything a clinic experiment needs: station
//! rates and capacities, routing probabilities, number of trials, horizon and
//! base seed. It deserializes from JSON and is validated before any trial
//! starts.
//!
//! ```
//! use clinicsim::ClinicConfig;
//!
//! let config = ClinicConfig::from_json(r#"{
//!     "arrival_rate": 10.0,
//!     "consultory_capacity": "unbounded",
//!     "bond_seller": { "rate": 10.0 },
//!     "reception": { "rate": 12.0 },
//!     "doctors": [{ "rate": 5.0 }, { "rate": 9.0, "capacity": { "bounded": 2 } }],
//!     "p": 0.8,
//!     "q": 0.3,
//!     "trials": 4,
//!     "horizon": 8.0
//! }"#).unwrap();
//! assert_eq!(config.seed, 0);
//! ```

use crate::error::ExperimentResult;
use clinic_components::{validate_positive, validate_range};
use clinic_core::time::MAX_UNITS;
use clinic_core::{validate_probability, validate_rate, Capacity, SimResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn single_slot() -> Capacity {
    Capacity::Bounded(1)
}

/// One service station
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Clients served per time unit
    pub rate: f64,
    #[serde(default = "single_slot")]
    pub capacity: Capacity,
}

impl StationConfig {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            capacity: single_slot(),
        }
    }

    fn validate(&self, name: &str) -> SimResult<()> {
        validate_rate(name, self.rate)?;
        self.capacity.validate(name)
    }
}

/// Parameters of a clinic experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// λ: clients arriving per time unit
    pub arrival_rate: f64,
    pub consultory_capacity: Capacity,
    /// α
    pub bond_seller: StationConfig,
    /// β
    pub reception: StationConfig,
    /// μ and γ
    pub doctors: [StationConfig; 2],
    /// Probability of visiting the bond-seller
    pub p: f64,
    /// Probability of seeing the first doctor
    pub q: f64,
    pub trials: u64,
    /// Time units simulated per trial
    pub horizon: f64,
    #[serde(default)]
    pub seed: u64,
}

impl ClinicConfig {
    /// The reference parameter table: an hour per time unit, two hours per
    /// trial.
    pub fn example() -> Self {
        Self {
            arrival_rate: 10.0,
            consultory_capacity: Capacity::Unbounded,
            bond_seller: StationConfig::new(10.0),
            reception: StationConfig::new(12.0),
            doctors: [StationConfig::new(5.0), StationConfig::new(9.0)],
            p: 0.8,
            q: 0.3,
            trials: 10,
            horizon: 2.0,
            seed: 0,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        validate_rate("arrival_rate", self.arrival_rate)?;
        self.consultory_capacity.validate("consultory")?;
        self.bond_seller.validate("bond_seller")?;
        self.reception.validate("reception")?;
        self.doctors[0].validate("doctor 1")?;
        self.doctors[1].validate("doctor 2")?;
        validate_probability("p", self.p)?;
        validate_probability("q", self.q)?;
        validate_range("trials", self.trials, 1, u64::MAX)?;
        validate_positive("horizon", self.horizon)?;
        validate_range("horizon", self.horizon, 0.0, MAX_UNITS)?;
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ExperimentResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ExperimentResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self::example()
    }
}
