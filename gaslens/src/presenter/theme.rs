//! Terminal color theme

use crossterm::style::Color;

use crate::analysis::Severity;

pub const HIGH_RED: Color = Color::Red;
pub const MEDIUM_AMBER: Color = Color::Yellow;
pub const LOW_CYAN: Color = Color::Cyan;
pub const SUCCESS_GREEN: Color = Color::Green;
pub const HEADER_MAGENTA: Color = Color::Magenta;
pub const INFO_WHITE: Color = Color::White;

/// Severity a breakdown row is styled as, from its share of total usage
/// - Above 20%: High
/// - Above 10%: Medium
/// - Otherwise: none
#[must_use]
pub fn share_severity(percentage: f64) -> Option<Severity> {
    if percentage > 20.0 {
        Some(Severity::High)
    } else if percentage > 10.0 {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// Heading marker and title for a severity group.
#[must_use]
pub fn severity_heading(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::High => ("🚨", "HIGH PRIORITY OPTIMIZATIONS"),
        Severity::Medium => ("⚠️ ", "MEDIUM PRIORITY OPTIMIZATIONS"),
        Severity::Low => ("ℹ️ ", "LOW PRIORITY OPTIMIZATIONS"),
    }
}
