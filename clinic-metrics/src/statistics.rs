//! Waiting time and population statistics over a server's [`StatLog`]
//!
//! All functions are pure reads of a log, so they can be evaluated after a
//! trial or at any point while it runs. Results are expressed in model time
//! units.
//!
//! Waiting times honour right-censoring: a client whose end action has not
//! happened by the close of the window contributes `window.to - start`.
//! Population averages sample the instantaneous count at every integer
//! instant of a range rather than integrating over continuous time.

use crate::stat::{Action, Stat, StatLog};
use clinic_core::time::duration_to_units;
use clinic_core::SimTime;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;

/// Observation window `[from, to]`; an open window has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub from: SimTime,
    pub to: Option<SimTime>,
}

impl Window {
    pub fn new(from: SimTime, to: SimTime) -> Self {
        Self { from, to: Some(to) }
    }

    /// `[0, to]`
    pub fn up_to(to: SimTime) -> Self {
        Self::new(SimTime::zero(), to)
    }

    /// Everything ever recorded. Unfinished visits cannot be censored
    /// against an open bound and are left out.
    pub fn all() -> Self {
        Self {
            from: SimTime::zero(),
            to: None,
        }
    }

    pub fn contains(&self, time: SimTime) -> bool {
        self.from <= time && self.to.map_or(true, |to| time <= to)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::all()
    }
}

/// Which part of a visit counts as "present"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    /// Between arrival and start of service
    Queued,
    /// Between start and end of service
    InService,
    /// Between arrival and end of service
    Total,
}

impl Occupancy {
    /// Boundary actions of the presence interval
    pub fn bounds(&self) -> (Action, Action) {
        match self {
            Occupancy::Queued => (Action::Arrive, Action::Enter),
            Occupancy::InService => (Action::Enter, Action::Exit),
            Occupancy::Total => (Action::Arrive, Action::Exit),
        }
    }
}

fn censored_span(stat: &Stat, start: Action, end: Action, window: &Window) -> Option<Duration> {
    let started = stat.get(start)?;
    if !window.contains(started) {
        return None;
    }
    let effective_end = match (stat.get(end), window.to) {
        (Some(ended), Some(to)) if ended > to => return None,
        (Some(ended), _) => ended,
        (None, Some(to)) => to,
        (None, None) => return None,
    };
    Some(effective_end - started)
}

/// One sample per client that started inside the window and either ended
/// inside it or has not ended yet.
pub fn waiting_times(log: &StatLog, start: Action, end: Action, window: Window) -> Vec<Duration> {
    log.stats()
        .filter_map(|stat| censored_span(stat, start, end, &window))
        .collect()
}

/// Arrival to exit
pub fn total_waiting_times(log: &StatLog, window: Window) -> Vec<Duration> {
    waiting_times(log, Action::Arrive, Action::Exit, window)
}

/// Arrival to start of service
pub fn queued_waiting_times(log: &StatLog, window: Window) -> Vec<Duration> {
    waiting_times(log, Action::Arrive, Action::Enter, window)
}

/// Start of service to exit
pub fn attention_waiting_times(log: &StatLog, window: Window) -> Vec<Duration> {
    waiting_times(log, Action::Enter, Action::Exit, window)
}

/// Mean of the samples in time units, `None` without samples
pub fn mean_units(samples: &[Duration]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let total: f64 = samples.iter().map(|d| duration_to_units(*d)).sum();
    Some(total / samples.len() as f64)
}

pub fn average_waiting_time(log: &StatLog, window: Window) -> Option<f64> {
    mean_units(&total_waiting_times(log, window))
}

pub fn average_queued_waiting_time(log: &StatLog, window: Window) -> Option<f64> {
    mean_units(&queued_waiting_times(log, window))
}

pub fn average_attention_waiting_time(log: &StatLog, window: Window) -> Option<f64> {
    mean_units(&attention_waiting_times(log, window))
}

/// Clients present at `t`: `start <= t` and `end` after `t` or unset.
pub fn population_at(log: &StatLog, t: SimTime, start: Action, end: Action) -> usize {
    log.stats()
        .filter(|stat| stat.get(start).is_some_and(|s| s <= t))
        .filter(|stat| stat.get(end).map_or(true, |e| e > t))
        .count()
}

pub fn occupancy_at(log: &StatLog, t: SimTime, occupancy: Occupancy) -> usize {
    let (start, end) = occupancy.bounds();
    population_at(log, t, start, end)
}

/// Clients that arrived by `t`, finished or not
pub fn arrived_by(log: &StatLog, t: SimTime) -> usize {
    log.stats()
        .filter(|stat| stat.arrive().is_some_and(|a| a <= t))
        .count()
}

/// Clients that arrived and exited by `t`
pub fn finished_at(log: &StatLog, t: SimTime) -> usize {
    log.stats()
        .filter(|stat| stat.arrive().is_some_and(|a| a <= t))
        .filter(|stat| stat.exit().is_some_and(|e| e <= t))
        .count()
}

/// Mean of `count(t)` over every integer instant `t` in `range`.
///
/// `None` when the range is empty.
pub fn sample_average<F>(range: Range<u64>, mut count: F) -> Option<f64>
where
    F: FnMut(SimTime) -> usize,
{
    if range.is_empty() {
        return None;
    }
    let samples = range.end - range.start;
    let total: usize = range.map(|t| count(SimTime::from_units(t))).sum();
    Some(total as f64 / samples as f64)
}

/// Mean population between `start` and `end` sampled at each integer
/// instant of `[from, to)`.
pub fn average_population(
    log: &StatLog,
    from: u64,
    to: u64,
    start: Action,
    end: Action,
) -> Option<f64> {
    sample_average(from..to, |t| population_at(log, t, start, end))
}

pub fn average_occupancy(log: &StatLog, range: Range<u64>, occupancy: Occupancy) -> Option<f64> {
    let (start, end) = occupancy.bounds();
    average_population(log, range.start, range.end, start, end)
}

pub fn average_finished(log: &StatLog, range: Range<u64>) -> Option<f64> {
    sample_average(range, |t| finished_at(log, t))
}

pub fn average_arrived(log: &StatLog, range: Range<u64>) -> Option<f64> {
    sample_average(range, |t| arrived_by(log, t))
}

/// Latest recorded exit
pub fn last_exit(log: &StatLog) -> Option<SimTime> {
    log.stats().filter_map(Stat::exit).max()
}

/// `[1, round(last exit))`, the sampling range used when none is given
pub fn default_population_range(log: &StatLog) -> Option<Range<u64>> {
    let last = last_exit(log)?;
    Some(1..last.as_units_f64().round() as u64)
}
