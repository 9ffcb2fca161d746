//! Analyzer thresholds and cost constants.
//!
//! Defaults follow post-Berlin gas costs. A JSON file may override any
//! subset of fields; unknown keys are rejected.

use serde::Deserialize;
use std::path::Path;

use crate::domain::ConfigError;

/// Approximate cost of a warm storage read.
pub const DEFAULT_WARM_READ_COST: u64 = 100;

/// Approximate base cost of an external call.
pub const DEFAULT_BASE_CALL_COST: u64 = 2100;

/// Thresholds and cost constants consumed by the pattern detector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Savings credited per redundant storage read.
    pub warm_read_cost: u64,

    /// Savings credited per external call when suggesting batching.
    pub base_call_cost: u64,

    /// Reads of one slot beyond this count are flagged, each time.
    pub redundant_read_threshold: u64,

    /// Memory sizes (bytes) above this are flagged on every step.
    pub memory_expansion_threshold: u64,

    /// LOG steps costing more than this are recorded as expensive.
    pub large_log_cost: u64,

    /// KECCAK256 steps costing more than this are recorded as expensive.
    pub expensive_hash_cost: u64,

    /// An opcode is hot when its usage exceeds `total / hot_opcode_divisor`.
    pub hot_opcode_divisor: u64,

    /// More external calls than this suggests batching.
    pub batch_call_threshold: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            warm_read_cost: DEFAULT_WARM_READ_COST,
            base_call_cost: DEFAULT_BASE_CALL_COST,
            redundant_read_threshold: 2,
            memory_expansion_threshold: 10_000,
            large_log_cost: 1000,
            expensive_hash_cost: 500,
            hot_opcode_divisor: 10,
            batch_call_threshold: 5,
        }
    }
}

impl AnalyzerConfig {
    /// Load overrides from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid JSON,
    /// names an unknown field, or sets `hot_opcode_divisor` to zero.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `hot_opcode_divisor` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hot_opcode_divisor == 0 {
            return Err(ConfigError::Invalid("hot_opcode_divisor must be non-zero".to_string()));
        }
        Ok(())
    }
}
