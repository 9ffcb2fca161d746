//! Recorded traces and the replay driver.
//!
//! A recorded trace is JSON Lines: one [`ExecutionEvent`] object per line,
//! tagged by `"event"`. Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"event":"tx_start","gas_limit":100000}
//! {"event":"step","pc":0,"op":"PUSH1","gas":100000,"cost":3,"depth":1}
//! {"event":"tx_end","gas_used":21003}
//! ```

use gaslens_common::ExecutionEvent;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::domain::TraceError;
use crate::tracer::ExecutionTracer;

/// An immutable recorded event sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceData {
    pub events: Vec<ExecutionEvent>,
}

impl TraceData {
    /// Load a recorded trace from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] if the file cannot be read, a line fails to
    /// parse, or the trace holds no events.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a recorded trace from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Parse`] with the 1-based line number of the first
    /// malformed line, or [`TraceError::Empty`] if no events were found.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, TraceError> {
        let mut events = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let event = serde_json::from_str(trimmed)
                .map_err(|source| TraceError::Parse { line: index + 1, source })?;
            events.push(event);
        }

        if events.is_empty() {
            return Err(TraceError::Empty);
        }
        debug!("Loaded {} recorded events", events.len());
        Ok(Self { events })
    }

    /// Write the trace as JSON Lines.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the write fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), TraceError> {
        for event in &self.events {
            let line = serde_json::to_string(event)
                .map_err(|e| TraceError::Io(std::io::Error::other(e)))?;
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether the recording ends with a `TxEnd`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.events.last(), Some(ExecutionEvent::TxEnd { .. }))
    }
}

/// Outcome of one replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Events handed to the tracer.
    pub delivered: usize,
    /// Whether a `TxEnd` was among them.
    pub saw_tx_end: bool,
}

/// Feed every recorded event to `tracer`, in order.
///
/// A recording without `TxEnd` is delivered as-is; the tracer is left
/// unfinished and its owner decides what to do with it.
pub fn replay<T: ExecutionTracer + ?Sized>(trace: &TraceData, tracer: &T) -> ReplaySummary {
    let mut saw_tx_end = false;
    for event in &trace.events {
        saw_tx_end |= matches!(event, ExecutionEvent::TxEnd { .. });
        tracer.dispatch(event);
    }
    ReplaySummary { delivered: trace.events.len(), saw_tx_end }
}
