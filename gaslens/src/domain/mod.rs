//! Domain model for gaslens
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time safety via newtype pattern
//! - Canonical renderings for locations and slot keys
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{Location, Pc, SlotKey};

pub use errors::{ConfigError, ReportError, SequencerError, TraceError};
