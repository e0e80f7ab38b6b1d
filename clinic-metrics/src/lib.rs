//! Statistics and observability for clinic simulations
//!
//! This crate records what happens to every client at every server and
//! derives the performance metrics of a run from those records:
//!
//! - [`stat`]: the [`Action`] taxonomy, per-visit [`Stat`] records and the
//!   per-server [`StatLog`]
//! - [`statistics`]: right-censored waiting times and sampled populations
//! - [`summary`]: descriptive statistics across trials
//! - [`sink`] and [`export`]: where recorded actions are streamed to

pub mod error;
pub mod export;
pub mod sink;
pub mod stat;
pub mod statistics;
pub mod summary;

pub use error::MetricsError;
pub use export::{export_json, ConsoleSink, JsonLinesSink};
pub use sink::{EventRecord, EventSink, MemorySink, NullSink, TracingSink};
pub use stat::{Action, Stat, StatLog};
pub use statistics::{Occupancy, Window};
pub use summary::Summary;
