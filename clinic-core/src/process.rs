//! Resumable processes
//!
//! A process is an explicit state machine that the scheduler re-enters at its
//! current suspension point. Every call to [`Process::resume`] runs the body
//! until the next suspension and reports it as a [`Yield`]:
//!
//! - [`Yield::Timeout`]: resume after a delay in virtual time
//! - [`Yield::Acquire`]: resume once a slot of a resource is granted
//! - [`Yield::Join`]: start a child process and resume when it finishes
//! - [`Yield::Done`]: the process terminated
//!
//! Nothing else suspends a process. While a body runs it has exclusive access
//! to the simulation world through its [`Context`].
//!
//! ```
//! use clinic_core::{Context, Process, Simulation, SimTime, Yield};
//! use std::time::Duration;
//!
//! struct Ticker {
//!     ticks: u32,
//! }
//!
//! impl Process<Vec<SimTime>> for Ticker {
//!     fn resume(&mut self, ctx: &mut Context<'_, Vec<SimTime>>) -> Yield<Vec<SimTime>> {
//!         let now = ctx.now();
//!         ctx.world_mut().push(now);
//!         if self.ticks == 0 {
//!             return Yield::Done;
//!         }
//!         self.ticks -= 1;
//!         Yield::Timeout(Duration::from_secs(1))
//!     }
//! }
//!
//! let mut sim = Simulation::new(Vec::new());
//! sim.spawn(Ticker { ticks: 2 });
//! sim.run(SimTime::from_units(10));
//! assert_eq!(sim.world().len(), 3);
//! ```

use crate::resource::Resource;
use crate::scheduler::Scheduler;
use crate::time::{units_to_duration, SimTime};
use crate::types::{ProcessId, ResourceId};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

/// Suspension point reported by a process body
pub enum Yield<W> {
    /// Resume after the given delay
    Timeout(Duration),
    /// Resume once a slot of the resource is held by this process
    Acquire(ResourceId),
    /// Start the child now and resume when it returns [`Yield::Done`]
    Join(Box<dyn Process<W>>),
    /// The process terminated
    Done,
}

impl<W> Yield<W> {
    /// Delay expressed in fractional time units.
    ///
    /// # Panics
    ///
    /// Panics on negative or non-finite delays.
    pub fn timeout_units(units: f64) -> Self {
        Yield::Timeout(units_to_duration(units))
    }

    pub fn join<P: Process<W>>(child: P) -> Self {
        Yield::Join(Box::new(child))
    }
}

impl<W: 'static> fmt::Debug for Yield<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Yield::Timeout(delay) => f.debug_tuple("Timeout").field(delay).finish(),
            Yield::Acquire(resource) => f.debug_tuple("Acquire").field(resource).finish(),
            Yield::Join(child) => f.debug_tuple("Join").field(&child.name()).finish(),
            Yield::Done => f.write_str("Done"),
        }
    }
}

/// A body that the scheduler resumes at its suspension points
pub trait Process<W>: 'static {
    /// Run until the next suspension point.
    fn resume(&mut self, ctx: &mut Context<'_, W>) -> Yield<W>;

    /// Label used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Lifecycle state of a registered process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Has a resume event at or before the current time
    Runnable,
    SuspendedOnTimeout,
    SuspendedOnResource(ResourceId),
    /// Waiting for a joined child to finish
    AwaitingChild(ProcessId),
    Terminated,
}

/// What a process body may touch while it runs
pub struct Context<'a, W> {
    world: &'a mut W,
    scheduler: &'a mut Scheduler,
    process: ProcessId,
    spawned: Vec<Box<dyn Process<W>>>,
}

impl<'a, W> Context<'a, W> {
    pub(crate) fn new(world: &'a mut W, scheduler: &'a mut Scheduler, process: ProcessId) -> Self {
        Self {
            world,
            scheduler,
            process,
            spawned: Vec::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> SimTime {
        self.scheduler.time()
    }

    /// Id of the process being resumed
    pub fn process_id(&self) -> ProcessId {
        self.process
    }

    pub fn world(&self) -> &W {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        self.world
    }

    pub fn resource(&self, resource: ResourceId) -> Option<&Resource> {
        self.scheduler.resource(resource)
    }

    /// Give back a slot of `resource`; the oldest waiter, if any, gets it.
    pub fn release(&mut self, resource: ResourceId) {
        self.scheduler.release_resource(resource);
    }

    /// Start an independent process at the current time.
    ///
    /// The caller keeps running; the new process is resumed after the events
    /// already due now.
    pub fn spawn<P: Process<W>>(&mut self, process: P) {
        self.spawned.push(Box::new(process));
    }

    pub(crate) fn into_spawned(self) -> Vec<Box<dyn Process<W>>> {
        self.spawned
    }
}

/// A process driven by a closure, handy for small bodies and tests
pub struct ClosureProcess<W, F> {
    body: F,
    _marker: PhantomData<fn(W)>,
}

impl<W, F> ClosureProcess<W, F>
where
    F: FnMut(&mut Context<'_, W>) -> Yield<W> + 'static,
{
    pub fn new(body: F) -> Self {
        Self {
            body,
            _marker: PhantomData,
        }
    }
}

impl<W: 'static, F> Process<W> for ClosureProcess<W, F>
where
    F: FnMut(&mut Context<'_, W>) -> Yield<W> + 'static,
{
    fn resume(&mut self, ctx: &mut Context<'_, W>) -> Yield<W> {
        (self.body)(ctx)
    }

    fn name(&self) -> &'static str {
        "ClosureProcess"
    }
}
