//! JSON export
//!
//! [`JsonLinesSink`] streams every event as one JSON object per line, which
//! suits `jq` and dataframe loaders. [`export_json`] writes any serialisable
//! report to a file.

use crate::error::MetricsError;
use crate::sink::{EventRecord, EventSink};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Writes each record as a JSON line to `W`.
///
/// Recording cannot fail mid-run; the first write error is kept, later
/// records are dropped and the error is returned by
/// [`EventSink::finish`] or [`JsonLinesSink::into_inner`].
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
    error: Option<MetricsError>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            error: None,
        }
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    fn write_line(&mut self, record: &EventRecord) -> Result<(), MetricsError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush_or_fail(&mut self) -> Result<(), MetricsError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand the writer back, or report the first failure.
    pub fn into_inner(mut self) -> Result<W, MetricsError> {
        self.flush_or_fail()?;
        Ok(self.writer)
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create (or truncate) `path` and stream records into it.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, MetricsError> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn record(&mut self, record: &EventRecord) {
        if self.error.is_some() {
            return;
        }
        match self.write_line(record) {
            Ok(()) => self.written += 1,
            Err(error) => {
                warn!(error = %error, "Event export failed, dropping further records");
                self.error = Some(error);
            }
        }
    }

    fn finish(&mut self) -> Result<(), MetricsError> {
        self.flush_or_fail()
    }
}

/// Serialise `value` as JSON into the file at `path`.
///
/// # Arguments
/// * `path` - Output file path
/// * `pretty` - Whether to pretty-print the JSON
pub fn export_json<T: Serialize>(
    value: &T,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), MetricsError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;

    let mut file = File::create(path.as_ref()).map_err(|e| {
        MetricsError::ExportError(format!(
            "Failed to create {}: {e}",
            path.as_ref().display()
        ))
    })?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
