//! Analysis logic for gas traces
//!
//! This module contains the pure heuristics that turn running aggregates into
//! findings, separated from the event plumbing in [`crate::tracer`] and the
//! presentation layer in [`crate::presenter`].

pub mod finding;
pub mod pattern_detector;

pub use finding::{DetailValue, Finding, FindingKind, FindingsLog, Severity};
pub use pattern_detector::PatternDetector;
