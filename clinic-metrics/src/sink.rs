//! Event sinks
//!
//! Every action recorded by a server is also emitted as an [`EventRecord`] to
//! the network's sink. The sink only observes; it never influences the run.

use crate::error::MetricsError;
use crate::stat::Action;
use clinic_core::{ClientId, ServerId, SimTime};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// One recorded action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub time: SimTime,
    pub client: ClientId,
    pub action: Action,
    pub server: ServerId,
    /// Kind of station, e.g. "Doctor"
    pub station: String,
}

/// Receives every recorded action in the order it happened
pub trait EventSink {
    fn record(&mut self, record: &EventRecord);

    /// Called once the run is over: flush buffered output and report any
    /// failure that `record` had to hold back.
    fn finish(&mut self) -> Result<(), MetricsError> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn record(&mut self, record: &EventRecord) {
        (**self).record(record)
    }

    fn finish(&mut self) -> Result<(), MetricsError> {
        (**self).finish()
    }
}

/// Fan out to several sinks
impl EventSink for Vec<Box<dyn EventSink>> {
    fn record(&mut self, record: &EventRecord) {
        for sink in self.iter_mut() {
            sink.record(record);
        }
    }

    /// Finishes every sink, then reports the first failure.
    fn finish(&mut self) -> Result<(), MetricsError> {
        let mut first = Ok(());
        for sink in self.iter_mut() {
            let result = sink.finish();
            if first.is_ok() {
                first = result;
            }
        }
        first
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _record: &EventRecord) {}
}

/// Collects records in memory.
///
/// Clones share the same buffer, so a handle kept outside the simulation
/// can read what the sink inside it collected.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EventRecord>> {
        // A poisoned buffer still holds every record pushed before the panic.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of everything recorded so far
    pub fn records(&self) -> Vec<EventRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, record: &EventRecord) {
        self.lock().push(record.clone());
    }
}

/// Emits each record as a structured `tracing` event at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, record: &EventRecord) {
        debug!(
            time = %record.time,
            client = %record.client,
            action = %record.action,
            server = %record.server,
            station = %record.station,
            "Stage event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(client: u64, action: Action) -> EventRecord {
        EventRecord {
            time: SimTime::from_units(client),
            client: ClientId(client),
            action,
            server: ServerId(1),
            station: "Doctor".to_string(),
        }
    }

    #[test]
    fn test_memory_sink_handles_share_buffer() {
        let handle = MemorySink::new();
        let mut sink: Box<dyn EventSink> = Box::new(handle.clone());
        sink.record(&record(1, Action::Arrive));
        sink.record(&record(2, Action::Enter));

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.records()[1].action, Action::Enter);
        handle.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_fan_out_reaches_every_sink() {
        let first = MemorySink::new();
        let second = MemorySink::new();
        let mut sinks: Vec<Box<dyn EventSink>> = vec![
            Box::new(first.clone()),
            Box::new(NullSink),
            Box::new(second.clone()),
        ];
        sinks.record(&record(3, Action::Exit));
        assert_eq!(first.records(), second.records());
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_record_serializes_flat() {
        let json = serde_json::to_value(record(4, Action::Arrive)).unwrap();
        assert_eq!(json["action"], "arrive");
        assert_eq!(json["client"], 4);
        assert_eq!(json["server"], 1);
        assert_eq!(json["time"], 4_000_000_000u64);
    }
}
