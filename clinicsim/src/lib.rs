//! # clinicsim
//!
//! Estimates steady-state waiting times and queue lengths of a clinic by
//! running independent, seeded discrete-event trials and averaging the
//! results.
//!
//! ```
//! use clinicsim::prelude::*;
//!
//! let config = ClinicConfig::example().with_trials(2).with_horizon(4.0);
//! let report = Experiment::new(config).unwrap().run().unwrap();
//! assert_eq!(report.trials.len(), 2);
//! ```
//!
//! The layers underneath are re-exported as [`core`], [`components`] and
//! [`metrics`].

pub mod config;
pub mod error;
pub mod experiment;
pub mod scenario;
pub mod trial;

pub use clinic_components as components;
pub use clinic_core as core;
pub use clinic_metrics as metrics;

pub use config::{ClinicConfig, StationConfig};
pub use error::{ExperimentError, ExperimentResult};
pub use experiment::{aggregate, Experiment, ExperimentReport, StationSummary};
pub use scenario::{build_clinic, ClinicLayout};
pub use trial::{run_trial, ServerReport, TrialReport};

pub mod prelude {
    //! Commonly used types and traits

    pub use clinic_core::{
        Capacity, Execute, Executor, Process, SimTime, Simulation, Yield,
    };

    pub use clinic_components::{
        ClinicRouting, Consultory, FixedRoute, Network, NetworkBuilder, RoutingStrategy, Server,
    };

    pub use clinic_metrics::{
        Action, ConsoleSink, EventSink, JsonLinesSink, MemorySink, NullSink, Occupancy, Summary,
        TracingSink, Window,
    };

    pub use crate::{ClinicConfig, Experiment, ExperimentReport, StationConfig};
}
