//! Structured logging for simulation debugging
//!
//! Every crate of the workspace logs through `tracing`. Nothing is printed
//! unless a subscriber is installed, which is what the initialisers below do.
//!
//! ```bash
//! # Default (info level)
//! cargo run --example clinic
//!
//! # Per-event engine activity
//! RUST_LOG=clinic_core=trace cargo run --example clinic
//! ```
//!
//! Level guidelines:
//! - **TRACE**: scheduling decisions and individual resumes (very verbose)
//! - **DEBUG**: process lifecycle and per-client stage records
//! - **INFO**: trial and experiment progress
//! - **WARN**: unusual conditions such as events for unknown processes

use crate::SimTime;
use tracing::{info, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at info level, honouring `RUST_LOG` when set.
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
///
/// Calling it a second time is harmless; the first subscriber stays installed.
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{level},clinic_core::scheduler=warn").into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
}

/// Initialize very verbose, pretty-printed logging for debugging a single run
pub fn init_detailed_simulation_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trace,clinic_core=trace,clinic_components=debug".into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Detailed simulation logging initialized");
    }
}

/// Span covering a whole experiment
pub fn simulation_span(name: &str) -> Span {
    tracing::info_span!("simulation", name = name)
}

/// Span covering one trial of an experiment
pub fn trial_span(trial: u64, seed: u64) -> Span {
    tracing::info_span!("trial", trial = trial, seed = seed)
}

/// Logging utilities for common simulation milestones
pub mod events {
    use super::*;

    pub fn simulation_started(name: &str, horizon: SimTime) {
        info!(simulation = name, horizon = %horizon, "Simulation started");
    }

    pub fn simulation_completed(name: &str, final_time: SimTime, steps: u64, live_processes: usize) {
        info!(
            simulation = name,
            final_time = %final_time,
            steps = steps,
            live_processes = live_processes,
            "Simulation completed"
        );
    }
}
