//! The clinic with its reference parameters.
//!
//! Prints the first trial's events as a time-of-day log, then the averages
//! over all trials.
//!
//! ```bash
//! cargo run --example clinic
//! RUST_LOG=clinic_components=debug cargo run --example clinic
//! ```

use clinicsim::core::init_simulation_logging;
use clinicsim::prelude::*;
use clinicsim::ExperimentResult;

fn main() -> ExperimentResult<()> {
    init_simulation_logging();

    let config = ClinicConfig::example();
    let experiment = Experiment::new(config)?;
    let report = experiment.run_with_sinks(|trial| {
        if trial == 0 {
            Box::new(ConsoleSink::default())
        } else {
            Box::new(NullSink)
        }
    })?;

    println!();
    println!(
        "{} trials of {} hours, {:.1} clients done per trial",
        report.trials.len(),
        report.config.horizon,
        report.clients_done.mean
    );
    for station in &report.stations {
        println!(
            "{:<11} #{}  wait {:>6.3} h (±{:.3})  queued {:>6.3} h  clients {:>5.2}",
            station.station,
            station.server.0,
            station.average_waiting_time.mean,
            station.average_waiting_time.std_dev,
            station.average_queue_waiting_time.mean,
            station.average_clients.mean,
        );
    }
    Ok(())
}
