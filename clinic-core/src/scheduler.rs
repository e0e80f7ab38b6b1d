use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;
use tracing::trace;

use crate::process::ProcessState;
use crate::resource::{Capacity, Resource};
use crate::time::SimTime;
use crate::types::{EventId, ProcessId, ResourceId};

/// Entry stored in the scheduler: the process to resume and when.
///
/// Entries are ordered by due time first and by scheduling order second, so
/// events due at the same instant resume in the order they were scheduled.
#[derive(Debug, Clone, Copy)]
pub struct EventEntry {
    id: EventId,
    time: SimTime,
    process: ProcessId,
}

impl EventEntry {
    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn process(&self) -> ProcessId {
        self.process
    }
}

impl PartialEq for EventEntry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.id == other.id
    }
}

impl Eq for EventEntry {}

impl PartialOrd for EventEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse the ordering for min-heap behavior in BinaryHeap
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Scheduler keeps the virtual clock, the pending resume events, the
/// resources and the lifecycle state of every registered process.
///
/// Process bodies live in [`Simulation`](crate::Simulation); the scheduler
/// only knows them by [`ProcessId`].
#[derive(Debug, Default)]
pub struct Scheduler {
    next_event_id: u64,
    next_process_id: u64,
    now: SimTime,
    events: BinaryHeap<EventEntry>,
    resources: Vec<Resource>,
    states: HashMap<ProcessId, ProcessState>,
}

impl Scheduler {
    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.now
    }

    /// Create a resource with the given capacity.
    pub fn add_resource(&mut self, capacity: Capacity) -> ResourceId {
        self.resources.push(Resource::new(capacity));
        ResourceId(self.resources.len() - 1)
    }

    pub fn resource(&self, resource: ResourceId) -> Option<&Resource> {
        self.resources.get(resource.0)
    }

    fn resource_mut(&mut self, resource: ResourceId) -> &mut Resource {
        match self.resources.get_mut(resource.0) {
            Some(entry) => entry,
            None => panic!("unknown {resource}"),
        }
    }

    pub(crate) fn register_process(&mut self) -> ProcessId {
        self.next_process_id += 1;
        let process = ProcessId(self.next_process_id);
        self.states.insert(process, ProcessState::Runnable);
        process
    }

    /// State of a registered process; `None` for ids never handed out.
    pub fn process_state(&self, process: ProcessId) -> Option<ProcessState> {
        match self.states.get(&process) {
            Some(state) => Some(*state),
            None if (1..=self.next_process_id).contains(&process.0) => {
                Some(ProcessState::Terminated)
            }
            None => None,
        }
    }

    pub(crate) fn set_state(&mut self, process: ProcessId, state: ProcessState) {
        self.states.insert(process, state);
    }

    /// Forget a finished process; only live processes keep an entry.
    pub(crate) fn terminate(&mut self, process: ProcessId) {
        self.states.remove(&process);
    }

    /// Processes that have not terminated, whatever they are waiting for
    pub fn live_processes(&self) -> usize {
        self.states.len()
    }

    fn push(&mut self, time: SimTime, process: ProcessId) {
        self.next_event_id += 1;
        let entry = EventEntry {
            id: EventId(self.next_event_id),
            time,
            process,
        };
        trace!(event_id = %entry.id, time = %time, process = %process, "Event scheduled");
        self.events.push(entry);
    }

    /// Resume `process` at the current time.
    pub fn schedule_now(&mut self, process: ProcessId) {
        self.set_state(process, ProcessState::Runnable);
        self.push(self.now, process);
    }

    /// Resume `process` at `now + delay`.
    pub fn schedule_timeout(&mut self, process: ProcessId, delay: Duration) {
        self.set_state(process, ProcessState::SuspendedOnTimeout);
        self.push(self.now + delay, process);
    }

    /// Ask for a slot of `resource` on behalf of `process`.
    ///
    /// When a slot is free the process is resumed at the current time and
    /// `true` is returned; otherwise it joins the tail of the wait list.
    pub fn request_resource(&mut self, resource: ResourceId, process: ProcessId) -> bool {
        let granted = self.resource_mut(resource).request(process);
        if granted {
            self.schedule_now(process);
        } else {
            trace!(resource = %resource, process = %process, "Waiting for resource");
            self.set_state(process, ProcessState::SuspendedOnResource(resource));
        }
        granted
    }

    /// Give back one slot of `resource`.
    ///
    /// The longest-waiting requester, if any, takes the slot over and is
    /// resumed at the current time.
    ///
    /// # Panics
    ///
    /// Panics when the resource has no slot in use.
    pub fn release_resource(&mut self, resource: ResourceId) {
        if let Some(next) = self.resource_mut(resource).release() {
            trace!(resource = %resource, process = %next, "Resource handed over");
            self.schedule_now(next);
        }
    }

    /// Returns a reference to the next scheduled event or `None` if none are left.
    pub fn peek(&self) -> Option<&EventEntry> {
        self.events.peek()
    }

    /// Removes and returns the next scheduled event, advancing the clock to it.
    pub(crate) fn pop(&mut self) -> Option<EventEntry> {
        self.events.pop().inspect(|event| {
            self.now = event.time;
        })
    }

    /// Move the clock forward without processing anything.
    pub(crate) fn advance_to(&mut self, time: SimTime) {
        if time > self.now {
            self.now = time;
        }
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_event_entry_cmp() {
        let entry = |id, secs| EventEntry {
            id: EventId(id),
            time: SimTime::from_units(secs),
            process: ProcessId(1),
        };
        // Earlier time sorts greater in the max-heap.
        assert_eq!(entry(2, 0).cmp(&entry(1, 1)), Ordering::Greater);
        // Same time: smaller sequence first.
        assert_eq!(entry(1, 1).cmp(&entry(2, 1)), Ordering::Greater);
        assert_eq!(entry(3, 1), entry(3, 1));
    }

    #[test]
    fn test_scheduler_pops_in_time_then_fifo_order() {
        let mut scheduler = Scheduler::default();
        let a = scheduler.register_process();
        let b = scheduler.register_process();
        let c = scheduler.register_process();

        scheduler.schedule_timeout(a, Duration::from_secs(1));
        scheduler.schedule_now(b);
        scheduler.schedule_timeout(c, Duration::from_secs(1));

        assert_eq!(scheduler.time(), SimTime::zero());
        assert_eq!(scheduler.pop().unwrap().process(), b);
        assert_eq!(scheduler.time(), SimTime::zero());
        assert_eq!(scheduler.pop().unwrap().process(), a);
        assert_eq!(scheduler.time(), SimTime::from_units(1));
        assert_eq!(scheduler.pop().unwrap().process(), c);
        assert!(scheduler.pop().is_none());
    }

    #[test]
    fn test_same_time_events_keep_insertion_order() {
        let mut scheduler = Scheduler::default();
        let processes: Vec<_> = (0..100).map(|_| scheduler.register_process()).collect();
        for process in &processes {
            scheduler.schedule_timeout(*process, Duration::from_secs(3));
        }
        let popped: Vec<_> = std::iter::from_fn(|| scheduler.pop().map(|e| e.process())).collect();
        assert_eq!(popped, processes);
    }

    #[test]
    fn test_request_and_release_resource() {
        let mut scheduler = Scheduler::default();
        let resource = scheduler.add_resource(Capacity::Bounded(1));
        let first = scheduler.register_process();
        let second = scheduler.register_process();

        assert!(scheduler.request_resource(resource, first));
        assert!(!scheduler.request_resource(resource, second));
        assert_eq!(
            scheduler.process_state(second),
            Some(ProcessState::SuspendedOnResource(resource))
        );
        assert_eq!(scheduler.pending_events(), 1);

        scheduler.release_resource(resource);
        assert_eq!(scheduler.process_state(second), Some(ProcessState::Runnable));
        assert_eq!(scheduler.pending_events(), 2);
        assert_eq!(scheduler.resource(resource).unwrap().in_use(), 1);
    }

    #[test]
    #[should_panic(expected = "released a resource with no slot in use")]
    fn test_release_unheld_resource_panics() {
        let mut scheduler = Scheduler::default();
        let resource = scheduler.add_resource(Capacity::Bounded(2));
        scheduler.release_resource(resource);
    }

    #[test]
    fn test_terminated_processes_are_forgotten() {
        let mut scheduler = Scheduler::default();
        let processes: Vec<_> = (0..10).map(|_| scheduler.register_process()).collect();
        for process in &processes[..7] {
            scheduler.terminate(*process);
        }
        assert_eq!(scheduler.live_processes(), 3);
        assert_eq!(scheduler.states.len(), 3);
        assert_eq!(
            scheduler.process_state(processes[0]),
            Some(ProcessState::Terminated)
        );
        assert_eq!(scheduler.process_state(processes[9]), Some(ProcessState::Runnable));
        assert_eq!(scheduler.process_state(ProcessId(11)), None);
        assert_eq!(scheduler.process_state(ProcessId(0)), None);
    }

    #[test]
    fn test_advance_to_never_goes_back() {
        let mut scheduler = Scheduler::default();
        scheduler.advance_to(SimTime::from_units(5));
        scheduler.advance_to(SimTime::from_units(2));
        assert_eq!(scheduler.time(), SimTime::from_units(5));
    }
}
