//! Suspension, joining and resource hand-off behaviour of the engine

use clinic_core::{
    Capacity, ClosureProcess, Context, Execute, Executor, Process, ProcessState, ResourceId,
    SimTime, Simulation, Yield,
};
use std::time::Duration;

#[derive(Default)]
struct Log {
    entries: Vec<(SimTime, &'static str)>,
}

fn holder(
    label: &'static str,
    resource: ResourceId,
    hold: Duration,
) -> ClosureProcess<Log, impl FnMut(&mut Context<'_, Log>) -> Yield<Log>> {
    let mut step = 0;
    ClosureProcess::new(move |ctx: &mut Context<'_, Log>| {
        step += 1;
        match step {
            1 => Yield::Acquire(resource),
            2 => {
                let now = ctx.now();
                ctx.world_mut().entries.push((now, label));
                Yield::Timeout(hold)
            }
            _ => {
                ctx.release(resource);
                Yield::Done
            }
        }
    })
}

#[test]
fn saturated_resource_serves_waiters_in_request_order() {
    let mut sim = Simulation::new(Log::default());
    let desk = sim.add_resource(Capacity::Bounded(1));
    for label in ["first", "second", "third", "fourth"] {
        sim.spawn(holder(label, desk, Duration::from_secs(1)));
    }
    sim.run(SimTime::from_units(100));

    let entries = &sim.world().entries;
    assert_eq!(
        entries,
        &vec![
            (SimTime::from_units(0), "first"),
            (SimTime::from_units(1), "second"),
            (SimTime::from_units(2), "third"),
            (SimTime::from_units(3), "fourth"),
        ]
    );
}

#[test]
fn capacity_is_never_exceeded_at_any_step() {
    let mut sim = Simulation::new(Log::default());
    let desk = sim.add_resource(Capacity::Bounded(3));
    for i in 0..40u64 {
        sim.spawn(holder("client", desk, Duration::from_millis(250 + 37 * i)));
    }

    let mut max_in_use = 0;
    Executor::unbound()
        .side_effect(|sim: &Simulation<Log>| {
            let resource = sim.scheduler().resource(desk).unwrap();
            assert!(resource.in_use() <= 3);
            max_in_use = max_in_use.max(resource.in_use());
        })
        .execute(&mut sim);

    assert_eq!(max_in_use, 3);
    assert_eq!(sim.world().entries.len(), 40);
    assert_eq!(sim.scheduler().resource(desk).unwrap().in_use(), 0);
}

struct Parent {
    step: u8,
}

impl Process<Log> for Parent {
    fn resume(&mut self, ctx: &mut Context<'_, Log>) -> Yield<Log> {
        self.step += 1;
        match self.step {
            1 => {
                let now = ctx.now();
                ctx.world_mut().entries.push((now, "parent-start"));
                let mut child_step = 0;
                Yield::join(ClosureProcess::new(move |ctx: &mut Context<'_, Log>| {
                    child_step += 1;
                    if child_step == 1 {
                        Yield::Timeout(Duration::from_secs(5))
                    } else {
                        let now = ctx.now();
                        ctx.world_mut().entries.push((now, "child-done"));
                        Yield::Done
                    }
                }))
            }
            _ => {
                let now = ctx.now();
                ctx.world_mut().entries.push((now, "parent-resumed"));
                Yield::Done
            }
        }
    }
}

#[test]
fn join_resumes_parent_when_child_finishes() {
    let mut sim = Simulation::new(Log::default());
    let parent = sim.spawn(Parent { step: 0 });

    Executor::steps(2).execute(&mut sim);
    assert!(matches!(
        sim.process_state(parent),
        Some(ProcessState::AwaitingChild(_))
    ));

    sim.run(SimTime::from_units(10));
    assert_eq!(sim.process_state(parent), Some(ProcessState::Terminated));
    assert_eq!(
        sim.world().entries,
        vec![
            (SimTime::zero(), "parent-start"),
            (SimTime::from_units(5), "child-done"),
            (SimTime::from_units(5), "parent-resumed"),
        ]
    );
    assert_eq!(sim.live_processes(), 0);
}

#[test]
fn processes_beyond_horizon_stay_suspended() {
    let mut sim = Simulation::new(Log::default());
    let desk = sim.add_resource(Capacity::Bounded(1));
    let a = sim.spawn(holder("a", desk, Duration::from_secs(10)));
    let b = sim.spawn(holder("b", desk, Duration::from_secs(10)));

    sim.run(SimTime::from_units(5));

    assert_eq!(sim.time(), SimTime::from_units(5));
    assert_eq!(sim.process_state(a), Some(ProcessState::SuspendedOnTimeout));
    assert_eq!(
        sim.process_state(b),
        Some(ProcessState::SuspendedOnResource(desk))
    );
    assert_eq!(sim.live_processes(), 2);
    assert_eq!(sim.world().entries.len(), 1);
}

#[test]
fn unbounded_resource_grants_everyone_immediately() {
    let mut sim = Simulation::new(Log::default());
    let hall = sim.add_resource(Capacity::Unbounded);
    for _ in 0..25 {
        sim.spawn(holder("guest", hall, Duration::from_secs(3)));
    }
    sim.run(SimTime::from_units(1));
    assert!(sim
        .world()
        .entries
        .iter()
        .all(|(time, _)| *time == SimTime::zero()));
    assert_eq!(sim.scheduler().resource(hall).unwrap().in_use(), 25);
}
