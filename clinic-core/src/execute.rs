use crate::{SimTime, Simulation};

/// Simulation execution trait.
pub trait Execute<W> {
    /// Executes the simulation until some stopping condition is reached.
    /// The condition is implementation-specific.
    fn execute(self, sim: &mut Simulation<W>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCondition {
    Time(SimTime),
    NoEvents,
    Steps(usize),
}

/// Executor is used for simple execution of an entire simulation.
///
/// A timed executor resumes every event due strictly before the horizon and
/// then leaves the clock at the horizon. Anything due later stays pending, so
/// processes caught mid-journey keep their unset timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    end_condition: EndCondition,
}

impl Executor {
    /// Simulation will end only once there is no available events in the queue.
    #[must_use]
    pub fn unbound() -> Self {
        Self {
            end_condition: EndCondition::NoEvents,
        }
    }

    /// Simulation will be run up to the given horizon.
    #[must_use]
    pub fn timed(time: SimTime) -> Self {
        Self {
            end_condition: EndCondition::Time(time),
        }
    }

    /// Simulation will execute exactly this many steps, unless we run out of events.
    #[must_use]
    pub fn steps(steps: usize) -> Self {
        Self {
            end_condition: EndCondition::Steps(steps),
        }
    }

    /// Registers a side effect that is called _after_ each simulation step.
    #[must_use]
    pub fn side_effect<W, F>(self, func: F) -> ExecutorWithSideEffect<F>
    where
        F: FnMut(&Simulation<W>),
    {
        ExecutorWithSideEffect {
            end_condition: self.end_condition,
            side_effect: func,
        }
    }
}

impl<W: 'static> Execute<W> for Executor {
    fn execute(self, sim: &mut Simulation<W>) {
        run_with(sim, self.end_condition, |_| {});
    }
}

pub struct ExecutorWithSideEffect<F> {
    end_condition: EndCondition,
    side_effect: F,
}

impl<W: 'static, F> Execute<W> for ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation<W>),
{
    fn execute(self, sim: &mut Simulation<W>) {
        run_with(sim, self.end_condition, self.side_effect);
    }
}

fn run_with<W: 'static, F>(sim: &mut Simulation<W>, end_condition: EndCondition, mut side_effect: F)
where
    F: FnMut(&Simulation<W>),
{
    let mut step_fn = |sim: &mut Simulation<W>| {
        let result = sim.step();
        if result {
            side_effect(sim);
        }
        result
    };
    match end_condition {
        EndCondition::Time(time) => {
            while sim.peek_next_event_time().is_some_and(|t| t < time) {
                step_fn(sim);
            }
            sim.scheduler_mut().advance_to(time);
        }
        EndCondition::NoEvents => while step_fn(sim) {},
        EndCondition::Steps(steps) => {
            for _ in 0..steps {
                if !step_fn(sim) {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Context, Process, Yield};
    use std::time::Duration;

    struct Counter {
        remaining: usize,
    }

    impl Process<usize> for Counter {
        fn resume(&mut self, ctx: &mut Context<'_, usize>) -> Yield<usize> {
            *ctx.world_mut() += 1;
            if self.remaining == 0 {
                return Yield::Done;
            }
            self.remaining -= 1;
            Yield::Timeout(Duration::from_secs(2))
        }
    }

    fn counting_sim(remaining: usize) -> Simulation<usize> {
        let mut sim = Simulation::new(0);
        sim.spawn(Counter { remaining });
        sim
    }

    #[test]
    fn test_create_executor() {
        assert_eq!(
            Executor::unbound(),
            Executor {
                end_condition: EndCondition::NoEvents
            }
        );
        assert_eq!(
            Executor::timed(SimTime::zero()),
            Executor {
                end_condition: EndCondition::Time(SimTime::zero())
            }
        );
        assert_eq!(
            Executor::steps(7),
            Executor {
                end_condition: EndCondition::Steps(7)
            }
        );
    }

    #[test]
    fn test_steps() {
        let mut sim = counting_sim(9);
        Executor::steps(10).execute(&mut sim);
        assert_eq!(*sim.world(), 10);
    }

    #[test]
    fn test_steps_stops_before() {
        let mut sim = counting_sim(9);
        // After 10 steps there are no events, so it will not execute all 100
        Executor::steps(100).execute(&mut sim);
        assert_eq!(*sim.world(), 10);
    }

    #[test]
    fn test_timed_excludes_events_at_horizon() {
        let mut sim = counting_sim(9);
        // Resumes at 0, 2, 4; the one due at 6 is left pending.
        Executor::timed(SimTime::from_units(6)).execute(&mut sim);
        assert_eq!(*sim.world(), 3);
        assert_eq!(sim.time(), SimTime::from_units(6));
        assert!(sim.has_pending_events());
    }

    #[test]
    fn test_timed_clock_reaches_horizon_when_queue_drains() {
        let mut sim = counting_sim(1);
        Executor::timed(SimTime::from_units(50)).execute(&mut sim);
        assert_eq!(*sim.world(), 2);
        assert_eq!(sim.time(), SimTime::from_units(50));
    }

    #[test]
    fn test_unbound() {
        let mut sim = counting_sim(4);
        Executor::unbound().execute(&mut sim);
        assert_eq!(*sim.world(), 5);
        assert_eq!(sim.time(), SimTime::from_units(8));
    }

    #[test]
    fn test_side_effect_sees_every_step() {
        let mut sim = counting_sim(4);
        let mut seen = Vec::new();
        Executor::unbound()
            .side_effect(|sim: &Simulation<usize>| seen.push(*sim.world()))
            .execute(&mut sim);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }
}
