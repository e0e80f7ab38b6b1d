//! Virtual time
//!
//! One model time unit (an hour in the clinic model, whatever the rates are
//! expressed against) maps to one `SimTime` second. Rates are always given per
//! time unit, so `SimTime::from(1.5)` is one and a half units after the start.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

const NANOS_PER_UNIT: u64 = 1_000_000_000;

/// Largest span, in time units, that a `SimTime` can hold
pub const MAX_UNITS: f64 = (u64::MAX as f64) / NANOS_PER_UNIT as f64;

/// Simulation time with nanosecond precision
///
/// SimTime represents a point in virtual time, stored as nanoseconds since the
/// simulation start. It is unrelated to wall-clock time and only advances when
/// the scheduler pops an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Latest representable instant, past any reachable horizon
    pub const MAX: SimTime = SimTime(u64::MAX);

    /// The simulation start
    pub const fn zero() -> Self {
        SimTime(0)
    }

    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    pub const fn from_millis(millis: u64) -> Self {
        SimTime(millis * 1_000_000)
    }

    /// Create a SimTime from whole time units
    pub const fn from_units(units: u64) -> Self {
        SimTime(units * NANOS_PER_UNIT)
    }

    pub fn from_duration(duration: Duration) -> Self {
        SimTime(duration.as_nanos() as u64)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Fractional time units since the start
    pub fn as_units_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_UNIT as f64
    }

    /// Calculate the duration since another SimTime (saturating at zero)
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    pub fn add_duration(&self, duration: Duration) -> Self {
        SimTime(self.0.saturating_add(duration.as_nanos() as u64))
    }

    pub fn sub_duration(&self, duration: Duration) -> Self {
        SimTime(self.0.saturating_sub(duration.as_nanos() as u64))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> Self::Output {
        self.add_duration(rhs)
    }
}

impl Sub<Duration> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.sub_duration(rhs)
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl From<f64> for SimTime {
    /// Convert from time units (as f64) to SimTime
    ///
    /// # Examples
    /// ```
    /// # use clinic_core::SimTime;
    /// let time = SimTime::from(1.5);
    /// assert_eq!(time.as_nanos(), 1_500_000_000);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the input is negative, infinite, or NaN.
    fn from(units: f64) -> Self {
        if !units.is_finite() {
            panic!("SimTime cannot be created from non-finite value: {units}");
        }
        if units < 0.0 {
            panic!("SimTime cannot be negative: {units}");
        }

        if units > MAX_UNITS {
            panic!("SimTime value too large: {units} units (max: {MAX_UNITS} units)");
        }

        SimTime::from_nanos((units * NANOS_PER_UNIT as f64) as u64)
    }
}

/// Convert a non-negative span in time units into a `Duration`.
///
/// # Panics
///
/// Panics on negative or non-finite input; a process asking for such a delay
/// is a defect, not a recoverable condition.
pub fn units_to_duration(units: f64) -> Duration {
    SimTime::from(units).as_duration()
}

/// Like [`units_to_duration`], but spans beyond [`MAX_UNITS`] clamp to
/// [`SimTime::MAX`] instead of panicking.
///
/// Random draws use this: an exponential sample at a tiny rate is legitimate
/// and simply lands after any horizon.
///
/// # Panics
///
/// Panics on negative or NaN input.
pub fn saturating_units_to_duration(units: f64) -> Duration {
    if units.is_nan() || units < 0.0 {
        panic!("SimTime cannot be negative: {units}");
    }
    if units >= MAX_UNITS {
        return SimTime::MAX.as_duration();
    }
    units_to_duration(units)
}

/// Express a `Duration` in fractional time units.
pub fn duration_to_units(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / NANOS_PER_UNIT as f64
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.4}", self.as_units_f64())
    }
}
