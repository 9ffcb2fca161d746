//! Structured error types for gaslens
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Protocol violations in the event stream are not errors: the tracer
//! tolerates them and logs. These types cover the surfaces that can fail.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report requested before the trace ended")]
    NotFinalized,

    #[error("Failed to serialize report: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to parse report: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to parse trace event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Trace contains no events")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("Event consumer has already shut down")]
    Closed,

    #[error("Event consumer thread panicked")]
    ConsumerPanicked,
}
