//! Human readable event log
//!
//! Renders simulated time as a wall-clock time of day, one model time unit
//! per hour, starting at 09:00:
//!
//! ```text
//! Time: 09:18 | 	Client #3 	-> 	arrive 	-> 	Reception #2
//! ```
//!
//! The number after the station kind is the network-wide server id, not a
//! count within the kind: in the clinic layout the second doctor prints as
//! `Doctor #2` and the receptionist as `Reception #4`.

use crate::error::MetricsError;
use crate::sink::{EventRecord, EventSink};
use clinic_core::SimTime;
use std::io::{self, Write};

/// Prints every record to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    enabled: bool,
    start_hour: u64,
    start_minute: u64,
}

impl ConsoleSink {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start_hour: 9,
            start_minute: 0,
        }
    }

    /// Time of day that corresponds to the simulation start
    pub fn starting_at(mut self, hour: u64, minute: u64) -> Self {
        self.start_hour = hour;
        self.start_minute = minute;
        self
    }

    /// `HH:MM` for `time`, rounding to the nearest minute
    pub fn time_of_day(&self, time: SimTime) -> String {
        let minutes = self.start_hour * 60
            + self.start_minute
            + (time.as_units_f64() * 60.0).round() as u64;
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }

    pub fn format_line(&self, record: &EventRecord) -> String {
        format!(
            "Time: {} | \t{} \t-> \t{} \t-> \t{} #{}",
            self.time_of_day(record.time),
            record.client,
            record.action,
            record.station,
            record.server.0
        )
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EventSink for ConsoleSink {
    fn record(&mut self, record: &EventRecord) {
        if !self.enabled {
            return;
        }
        println!("{}", self.format_line(record));
    }

    fn finish(&mut self) -> Result<(), MetricsError> {
        io::stdout().flush()?;
        Ok(())
    }
}
