//! Report snapshot and its JSON form.
//!
//! The JSON layout is the machine-readable output of the tool. Field order
//! follows the struct declarations and every map is a `BTreeMap`, so two
//! reports of the same trace serialize byte-for-byte identically.
//!
//! ```json
//! {
//!   "total_gas_used": 21000,
//!   "storage_reads": 1,
//!   "storage_writes": 0,
//!   "memory_operations": 2,
//!   "call_operations": 0,
//!   "expensive_ops": 0,
//!   "optimizations": [ ... ],
//!   "gas_by_opcode": { "MSTORE": 6, "SLOAD": 2100 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::analysis::Finding;
use crate::domain::ReportError;
use crate::tracer::RunningState;

/// Immutable snapshot of one trace's aggregates and findings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Report {
    pub total_gas_used: u64,
    /// Distinct slots read.
    pub storage_reads: usize,
    /// Distinct slots written.
    pub storage_writes: usize,
    pub memory_operations: usize,
    pub call_operations: usize,
    pub expensive_ops: usize,
    pub optimizations: Vec<Finding>,
    pub gas_by_opcode: BTreeMap<String, u64>,
}

impl Report {
    /// Build a snapshot from the current state.
    #[must_use]
    pub fn from_state(state: &RunningState) -> Self {
        Self {
            total_gas_used: state.total_gas_used(),
            storage_reads: state.distinct_slots_read(),
            storage_writes: state.distinct_slots_written(),
            memory_operations: state.memory_ops().len(),
            call_operations: state.call_ops().len(),
            expensive_ops: state.expensive_ops().len(),
            optimizations: state.findings().to_vec(),
            gas_by_opcode: state.gas_per_opcode().clone(),
        }
    }

    /// Sum of every finding's estimated savings.
    #[must_use]
    pub fn total_savings(&self) -> u64 {
        self.optimizations.iter().fold(0u64, |acc, f| acc.saturating_add(f.gas_savings))
    }

    /// Pretty-printed JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(ReportError::Serialize)
    }

    /// Parse a report previously produced by [`Report::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Deserialize`] if `json` is not a valid report.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(ReportError::Deserialize)
    }

    /// Write the pretty JSON form followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut writer, self).map_err(ReportError::Serialize)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
