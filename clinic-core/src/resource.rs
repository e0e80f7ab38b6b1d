//! Bounded FIFO resources
//!
//! A resource is a counting semaphore with strict FIFO hand-off and no wait
//! timeout. The scheduler owns all resources; processes only see a
//! [`ResourceId`](crate::ResourceId) and interact through
//! [`Yield::Acquire`](crate::Yield::Acquire) and
//! [`Context::release`](crate::Context::release).

use crate::error::{SimError, SimResult};
use crate::types::ProcessId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of simultaneous holders of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

impl Capacity {
    /// Bounded capacity; zero slots is rejected.
    pub fn bounded(slots: usize) -> SimResult<Self> {
        let capacity = Capacity::Bounded(slots);
        capacity.validate("resource")?;
        Ok(capacity)
    }

    pub fn validate(&self, name: &str) -> SimResult<()> {
        match self {
            Capacity::Bounded(0) => Err(SimError::InvalidCapacity {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Whether `in_use` holders leave room for one more
    pub fn admits(&self, in_use: usize) -> bool {
        match self {
            Capacity::Bounded(slots) => in_use < *slots,
            Capacity::Unbounded => true,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::Bounded(slots) => Some(*slots),
            Capacity::Unbounded => None,
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(slots) => write!(f, "{slots}"),
            Capacity::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Acquisition state of one resource.
#[derive(Debug, Clone)]
pub struct Resource {
    capacity: Capacity,
    in_use: usize,
    waiters: VecDeque<ProcessId>,
    total_granted: u64,
}

impl Resource {
    pub(crate) fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            in_use: 0,
            waiters: VecDeque::new(),
            total_granted: 0,
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Number of slots currently held
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Number of processes waiting for a slot
    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }

    /// Free slots, `None` when unbounded
    pub fn available(&self) -> Option<usize> {
        self.capacity.limit().map(|slots| slots - self.in_use)
    }

    /// Slots handed out over the resource's lifetime
    pub fn total_granted(&self) -> u64 {
        self.total_granted
    }

    /// Waiting processes, oldest first
    pub fn waiters(&self) -> impl Iterator<Item = &ProcessId> {
        self.waiters.iter()
    }

    /// Grant a slot to `process` or append it to the wait list.
    ///
    /// Returns `true` when the slot was granted immediately.
    pub(crate) fn request(&mut self, process: ProcessId) -> bool {
        if self.waiters.is_empty() && self.capacity.admits(self.in_use) {
            self.in_use += 1;
            self.total_granted += 1;
            true
        } else {
            self.waiters.push_back(process);
            false
        }
    }

    /// Free one slot and hand it to the oldest waiter, if any.
    ///
    /// # Panics
    ///
    /// Panics when no slot is held.
    pub(crate) fn release(&mut self) -> Option<ProcessId> {
        assert!(self.in_use > 0, "released a resource with no slot in use");
        self.in_use -= 1;
        let next = self.waiters.pop_front()?;
        self.in_use += 1;
        self.total_granted += 1;
        Some(next)
    }
}
