//! Per-client stage records
//!
//! Every server keeps one [`Stat`] per client that visited it. A timestamp
//! that is still `None` when a trial ends is a right-censored observation,
//! not a missing value.

use clinic_core::{ClientId, SimTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// The three observable moments of a client's visit to a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Joined the server's queue
    Arrive,
    /// Began service
    Enter,
    /// Finished service
    Exit,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Arrive, Action::Enter, Action::Exit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Arrive => "arrive",
            Action::Enter => "enter",
            Action::Exit => "exit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamps of one client at one server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    arrive: Option<SimTime>,
    enter: Option<SimTime>,
    exit: Option<SimTime>,
}

impl Stat {
    pub fn get(&self, action: Action) -> Option<SimTime> {
        match action {
            Action::Arrive => self.arrive,
            Action::Enter => self.enter,
            Action::Exit => self.exit,
        }
    }

    pub fn arrive(&self) -> Option<SimTime> {
        self.arrive
    }

    pub fn enter(&self) -> Option<SimTime> {
        self.enter
    }

    pub fn exit(&self) -> Option<SimTime> {
        self.exit
    }

    /// Record `action` at `time`.
    ///
    /// # Panics
    ///
    /// Panics when the action was already recorded or when `time` precedes an
    /// earlier action of the same visit.
    pub fn set(&mut self, action: Action, time: SimTime) {
        assert!(
            self.get(action).is_none(),
            "{action} recorded twice for the same visit"
        );
        for earlier in Action::ALL.iter().filter(|a| **a < action) {
            if let Some(previous) = self.get(*earlier) {
                assert!(
                    previous <= time,
                    "{action} at {time} precedes {earlier} at {previous}"
                );
            }
        }
        let slot = match action {
            Action::Arrive => &mut self.arrive,
            Action::Enter => &mut self.enter,
            Action::Exit => &mut self.exit,
        };
        *slot = Some(time);
    }

    /// All three timestamps are known
    pub fn is_complete(&self) -> bool {
        self.arrive.is_some() && self.enter.is_some() && self.exit.is_some()
    }

    /// Elapsed time between two recorded actions
    pub fn span(&self, start: Action, end: Action) -> Option<Duration> {
        Some(self.get(end)? - self.get(start)?)
    }
}

/// A server's log: at most one [`Stat`] per client, ordered by client id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLog {
    stats: BTreeMap<ClientId, Stat>,
}

impl StatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `action` of `client` at `time`, creating the client's entry on
    /// first use.
    pub fn record(&mut self, client: ClientId, action: Action, time: SimTime) {
        self.stats.entry(client).or_default().set(action, time);
    }

    pub fn get(&self, client: ClientId) -> Option<&Stat> {
        self.stats.get(&client)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClientId, &Stat)> {
        self.stats.iter()
    }

    pub fn stats(&self) -> impl Iterator<Item = &Stat> {
        self.stats.values()
    }

    pub fn clients(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.stats.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
