//! Export of recorded events and reports
//!
//! - [`json`]: one JSON object per event line, and whole reports as JSON documents
//! - [`console`]: the human readable time-of-day log

pub mod console;
pub mod json;

pub use console::ConsoleSink;
pub use json::{export_json, JsonLinesSink};
