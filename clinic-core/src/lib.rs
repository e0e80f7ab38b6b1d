//! Core discrete event simulation engine.
//!
//! This crate provides the building blocks the clinic model runs on: virtual
//! time, a deterministic event scheduler, cooperative processes and bounded
//! FIFO resources.
//!
//! # Architecture Overview
//!
//! - [`Simulation`]: owns the scheduler, the process bodies and the world `W`
//!   that the processes act on. Use it to spawn processes and run to a horizon.
//! - [`Scheduler`]: the virtual clock, the pending resume events and the
//!   resources. Events due at the same instant are resumed in the order they
//!   were scheduled, so a run is fully determined by its inputs.
//! - [`Process`]: an explicit resumable state machine. It runs until it
//!   reports a [`Yield`] and is re-entered later by the scheduler.
//!
//! # Basic Usage
//!
//! ```
//! use clinic_core::{Capacity, ClosureProcess, Context, Simulation, SimTime, Yield};
//! use std::time::Duration;
//!
//! let mut sim = Simulation::new(Vec::<SimTime>::new());
//! let desk = sim.add_resource(Capacity::Bounded(1));
//!
//! for _ in 0..2 {
//!     let mut step = 0;
//!     sim.spawn(ClosureProcess::new(move |ctx: &mut Context<'_, Vec<SimTime>>| {
//!         step += 1;
//!         match step {
//!             1 => Yield::Acquire(desk),
//!             2 => Yield::Timeout(Duration::from_secs(1)),
//!             _ => {
//!                 let now = ctx.now();
//!                 ctx.world_mut().push(now);
//!                 ctx.release(desk);
//!                 Yield::Done
//!             }
//!         }
//!     }));
//! }
//!
//! sim.run(SimTime::from_units(10));
//! assert_eq!(sim.world(), &vec![SimTime::from_units(1), SimTime::from_units(2)]);
//! ```
//!
//! # Time Model
//!
//! All timing uses [`SimTime`], which represents virtual time (not wall-clock
//! time). One model time unit is one `SimTime` second.

pub mod dists;
pub mod error;
pub mod execute;
pub mod ids;
pub mod logging;
pub mod process;
pub mod randomness;
pub mod resource;
pub mod scheduler;
pub mod time;
pub mod types;

use std::collections::HashMap;
use tracing::{debug, instrument, trace, warn};

pub use dists::{ConstantServiceTime, Exponential, ServiceTimeDistribution};
pub use error::{validate_probability, validate_rate, SimError, SimResult};
pub use execute::{Execute, Executor};
pub use ids::{derive_seed, ClientId, Registry, ServerId};
pub use logging::{
    init_detailed_simulation_logging, init_simulation_logging, init_simulation_logging_with_level,
    simulation_span, trial_span,
};
pub use process::{ClosureProcess, Context, Process, ProcessState, Yield};
pub use randomness::{seeded_rng, SimRng};
pub use resource::{Capacity, Resource};
pub use scheduler::{EventEntry, Scheduler};
pub use time::SimTime;
pub use types::{EventId, ProcessId, ResourceId};

struct ProcessSlot<W> {
    body: Box<dyn Process<W>>,
    parent: Option<ProcessId>,
}

/// Simulation struct that puts the scheduler, the processes and the world together.
///
/// See the [crate-level documentation](index.html) for more information.
pub struct Simulation<W> {
    scheduler: Scheduler,
    processes: HashMap<ProcessId, ProcessSlot<W>>,
    world: W,
    steps: u64,
}

impl<W: 'static> Simulation<W> {
    pub fn new(world: W) -> Self {
        Self {
            scheduler: Scheduler::default(),
            processes: HashMap::new(),
            world,
            steps: 0,
        }
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.scheduler.time()
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Consume the simulation, keeping only the world (logs, clients, ...)
    pub fn into_world(self) -> W {
        self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Create a resource owned by this simulation's scheduler.
    pub fn add_resource(&mut self, capacity: Capacity) -> ResourceId {
        self.scheduler.add_resource(capacity)
    }

    /// Register a process; it starts at the current time.
    pub fn spawn<P: Process<W>>(&mut self, process: P) -> ProcessId {
        self.register(Box::new(process), None)
    }

    fn register(&mut self, body: Box<dyn Process<W>>, parent: Option<ProcessId>) -> ProcessId {
        let process = self.scheduler.register_process();
        debug!(process = %process, name = body.name(), parent = ?parent, "Process spawned");
        self.scheduler.schedule_now(process);
        self.processes.insert(process, ProcessSlot { body, parent });
        process
    }

    pub fn process_state(&self, process: ProcessId) -> Option<ProcessState> {
        self.scheduler.process_state(process)
    }

    /// Performs one step of the simulation. Returns `true` if there was in fact an event
    /// available to process, and `false` otherwise, which signifies that the simulation
    /// ended.
    pub fn step(&mut self) -> bool {
        let Some(event) = self.scheduler.pop() else {
            return false;
        };
        self.steps += 1;

        let process = event.process();
        let Some(mut slot) = self.processes.remove(&process) else {
            warn!(process = %process, event_id = %event.id(), "Dropping event for unknown process");
            return true;
        };

        trace!(
            event_time = %event.time(),
            process = %process,
            name = slot.body.name(),
            "Resuming process"
        );
        self.scheduler.set_state(process, ProcessState::Runnable);

        let mut ctx = Context::new(&mut self.world, &mut self.scheduler, process);
        let outcome = slot.body.resume(&mut ctx);
        let spawned = ctx.into_spawned();

        for child in spawned {
            self.register(child, None);
        }

        match outcome {
            Yield::Timeout(delay) => {
                self.scheduler.schedule_timeout(process, delay);
                self.processes.insert(process, slot);
            }
            Yield::Acquire(resource) => {
                self.scheduler.request_resource(resource, process);
                self.processes.insert(process, slot);
            }
            Yield::Join(child) => {
                let child = self.register(child, Some(process));
                self.scheduler
                    .set_state(process, ProcessState::AwaitingChild(child));
                self.processes.insert(process, slot);
            }
            Yield::Done => {
                trace!(process = %process, "Process terminated");
                self.scheduler.terminate(process);
                if let Some(parent) = slot.parent {
                    self.scheduler.schedule_now(parent);
                }
            }
        }

        true
    }

    /// Run every event due strictly before `until`, then leave the clock at `until`.
    ///
    /// Processes whose next event lies at or beyond the horizon stay suspended.
    #[instrument(skip(self), fields(initial_time = %self.time()))]
    pub fn run(&mut self, until: SimTime) {
        self.execute(Executor::timed(until));
    }

    /// Runs the simulation with the given executor.
    pub fn execute<E: Execute<W>>(&mut self, executor: E) {
        executor.execute(self);
        debug!(final_time = %self.time(), steps = self.steps, "Execution finished");
    }

    /// Returns the time of the next scheduled event, or None if no events are scheduled.
    pub fn peek_next_event_time(&self) -> Option<SimTime> {
        self.scheduler.peek().map(|e| e.time())
    }

    pub fn has_pending_events(&self) -> bool {
        self.scheduler.peek().is_some()
    }

    /// Number of events processed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Processes that have not terminated (suspended past the horizon included)
    pub fn live_processes(&self) -> usize {
        self.scheduler.live_processes()
    }
}
