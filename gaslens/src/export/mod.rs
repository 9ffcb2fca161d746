//! Report export
//!
//! Builds the immutable [`Report`] snapshot from a finished trace and writes
//! it as pretty-printed JSON, the machine-readable output mode.

pub mod report;

pub use report::Report;
