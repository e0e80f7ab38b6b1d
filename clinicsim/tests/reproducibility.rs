//! Replays with identical inputs must agree exactly

use clinicsim::prelude::*;
use clinicsim::run_trial;

fn single_server_average_wait(seed: u64) -> f64 {
    let mut builder = NetworkBuilder::new(seed);
    let server = builder.station("Server", 5.0, Capacity::Bounded(1)).unwrap();
    let entry = builder
        .consultory(
            "Entry",
            4.0,
            Capacity::Unbounded,
            Consultory::with_strategy(Box::new(FixedRoute::new(vec![server]))),
        )
        .unwrap();
    builder.arrivals(entry).unwrap();

    let mut sim = builder.build();
    let horizon = SimTime::from_units(1000);
    sim.run(horizon);
    sim.world()
        .server(server)
        .unwrap()
        .average_waiting_time(Window::up_to(horizon))
        .unwrap()
}

#[test]
fn single_server_replay_matches() {
    let first = single_server_average_wait(2024);
    let second = single_server_average_wait(2024);
    assert_eq!(first.to_bits(), second.to_bits());
    // M/M/1 with λ = 4, μ = 5 spends 1 / (μ - λ) = 1 unit in the system.
    assert!((0.5..2.0).contains(&first), "average wait {first}");
}

#[test]
fn experiment_replay_matches() {
    let config = ClinicConfig::example()
        .with_trials(4)
        .with_horizon(12.0)
        .with_seed(17);
    let first = Experiment::new(config.clone()).unwrap().run().unwrap();
    let second = Experiment::new(config).unwrap().run().unwrap();
    assert_eq!(first, second);
}

#[test]
fn trials_are_independent_of_experiment_size() {
    let config = ClinicConfig::example().with_horizon(6.0).with_seed(5);
    let small = Experiment::new(config.clone().with_trials(2))
        .unwrap()
        .run()
        .unwrap();
    let large = Experiment::new(config.clone().with_trials(5))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(small.trials[..], large.trials[..2]);

    let alone = run_trial(&config, 3, Box::new(NullSink)).unwrap();
    assert_eq!(alone, large.trials[3]);
}

#[test]
fn event_sinks_do_not_change_results() {
    let config = ClinicConfig::example().with_trials(2).with_horizon(5.0);
    let experiment = Experiment::new(config).unwrap();
    let silent = experiment.run().unwrap();

    let memory = MemorySink::new();
    let handle = memory.clone();
    let observed = experiment
        .run_with_sinks(move |_| Box::new(handle.clone()))
        .unwrap();

    assert_eq!(silent, observed);
    assert!(!memory.is_empty());
}
