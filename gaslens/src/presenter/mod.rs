//! Human-readable rendering of findings and usage breakdowns.
//!
//! All appearance settings live in an immutable [`PresenterConfig`] handed to
//! the [`Presenter`] at construction; nothing here reads global state.

pub mod format;
pub mod theme;

use crossterm::style::Color;

use crate::analysis::Severity;

pub use format::{format_gas, Presenter, RECOMMENDATIONS};

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterConfig {
    /// Emit ANSI styling.
    pub color: bool,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
    pub header: Color,
    pub success: Color,
    pub info: Color,
    /// Width of banner and separator rules, in characters.
    pub rule_width: usize,
    /// Rows shown in the gas breakdown.
    pub top_n: usize,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            color: true,
            high: theme::HIGH_RED,
            medium: theme::MEDIUM_AMBER,
            low: theme::LOW_CYAN,
            header: theme::HEADER_MAGENTA,
            success: theme::SUCCESS_GREEN,
            info: theme::INFO_WHITE,
            rule_width: 63,
            top_n: 10,
        }
    }
}

impl PresenterConfig {
    /// Default settings without styling.
    #[must_use]
    pub fn plain() -> Self {
        Self { color: false, ..Self::default() }
    }

    #[must_use]
    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}
