//! Multi-trial experiments
//!
//! An experiment runs every trial of a [`ClinicConfig`] independently and
//! summarises each station's metrics across trials.

use crate::config::ClinicConfig;
use crate::error::ExperimentResult;
use crate::trial::{run_trial, ServerReport, TrialReport};
use clinic_core::{simulation_span, ServerId};
use clinic_metrics::{export_json, EventSink, NullSink, Summary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One station's metrics summarised over all trials.
///
/// Trials in which a metric was undefined are left out of its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub server: ServerId,
    pub station: String,
    pub average_waiting_time: Summary,
    pub average_queue_waiting_time: Summary,
    pub average_attention_waiting_time: Summary,
    pub average_clients: Summary,
    pub average_queued_clients: Summary,
    pub clients: Summary,
}

impl StationSummary {
    fn aggregate(server: ServerId, station: String, reports: &[&ServerReport]) -> Self {
        let summarise = |metric: fn(&ServerReport) -> Option<f64>| {
            Summary::from_optional(reports.iter().map(|r| metric(r)))
        };
        Self {
            server,
            station,
            average_waiting_time: summarise(|r| r.average_waiting_time),
            average_queue_waiting_time: summarise(|r| r.average_queue_waiting_time),
            average_attention_waiting_time: summarise(|r| r.average_attention_waiting_time),
            average_clients: summarise(|r| r.average_clients),
            average_queued_clients: summarise(|r| r.average_queued_clients),
            clients: summarise(|r| Some(r.clients as f64)),
        }
    }
}

/// Everything an experiment produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub config: ClinicConfig,
    pub trials: Vec<TrialReport>,
    pub stations: Vec<StationSummary>,
    pub clients_done: Summary,
}

impl ExperimentReport {
    pub fn station(&self, id: ServerId) -> Option<&StationSummary> {
        self.stations.iter().find(|s| s.server == id)
    }

    /// Write the report as JSON.
    pub fn export_json(&self, path: impl AsRef<Path>, pretty: bool) -> ExperimentResult<()> {
        export_json(self, path, pretty)?;
        Ok(())
    }
}

/// A validated experiment, ready to run
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ClinicConfig,
}

impl Experiment {
    pub fn new(config: ClinicConfig) -> ExperimentResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    /// Run every trial without recording events.
    pub fn run(&self) -> ExperimentResult<ExperimentReport> {
        self.run_with_sinks(|_| Box::new(NullSink))
    }

    /// Run every trial, sending trial `i`'s events to `sink_for(i)`.
    pub fn run_with_sinks<F>(&self, mut sink_for: F) -> ExperimentResult<ExperimentReport>
    where
        F: FnMut(u64) -> Box<dyn EventSink>,
    {
        let span = simulation_span("clinic");
        let _guard = span.enter();
        info!(
            trials = self.config.trials,
            horizon = self.config.horizon,
            seed = self.config.seed,
            "Experiment started"
        );

        let trials = (0..self.config.trials)
            .map(|trial| run_trial(&self.config, trial, sink_for(trial)))
            .collect::<ExperimentResult<Vec<_>>>()?;

        let report = aggregate(self.config.clone(), trials);
        info!(
            stations = report.stations.len(),
            clients_done = report.clients_done.mean,
            "Experiment finished"
        );
        Ok(report)
    }
}

/// Summarise trial reports station by station.
pub fn aggregate(config: ClinicConfig, trials: Vec<TrialReport>) -> ExperimentReport {
    let mut stations = Vec::new();
    if let Some(first) = trials.first() {
        for template in &first.servers {
            let reports: Vec<&ServerReport> = trials
                .iter()
                .filter_map(|trial| trial.server(template.server))
                .collect();
            stations.push(StationSummary::aggregate(
                template.server,
                template.station.clone(),
                &reports,
            ));
        }
    }
    let clients_done = Summary::from_samples(
        &trials
            .iter()
            .map(|t| t.clients_done as f64)
            .collect::<Vec<_>>(),
    );
    ExperimentReport {
        config,
        trials,
        stations,
        clients_done,
    }
}
