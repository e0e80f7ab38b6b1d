//! Reports and event streams written to disk

use clinicsim::prelude::*;
use clinicsim::{run_trial, ExperimentError};
use std::io::BufRead;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("clinicsim-{}-{name}", std::process::id()))
}

#[test]
fn experiment_report_round_trips_through_json() {
    let report = Experiment::new(ClinicConfig::example().with_trials(2).with_horizon(5.0))
        .unwrap()
        .run()
        .unwrap();
    let path = temp_path("report.json");
    report.export_json(&path, true).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: ExperimentReport = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.trials.len(), 2);
    assert_eq!(parsed.stations.len(), report.stations.len());
    assert_eq!(parsed.config, report.config);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn json_lines_sink_streams_every_event() {
    let path = temp_path("events.jsonl");
    let sink = JsonLinesSink::create(&path).unwrap();
    let memory = MemorySink::new();
    let sinks: Vec<Box<dyn EventSink>> = vec![Box::new(sink), Box::new(memory.clone())];

    let config = ClinicConfig::example().with_horizon(3.0);
    run_trial(&config, 0, Box::new(sinks)).unwrap();

    // the trial finishes its sinks, flushing the buffered writer
    let file = std::fs::File::open(&path).unwrap();
    let lines: Vec<String> = std::io::BufReader::new(file)
        .lines()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(lines.len(), memory.len());
    let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first["action"], "arrive");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn config_file_errors_are_reported() {
    let missing = ClinicConfig::from_file(temp_path("does-not-exist.json"));
    assert!(matches!(missing, Err(ExperimentError::Io(_))));

    let path = temp_path("bad-config.json");
    let mut config = serde_json::to_value(ClinicConfig::example()).unwrap();
    config["p"] = serde_json::json!(2.0);
    std::fs::write(&path, config.to_string()).unwrap();
    assert!(matches!(
        ClinicConfig::from_file(&path),
        Err(ExperimentError::Simulation(_))
    ));
    std::fs::remove_file(&path).unwrap();
}
