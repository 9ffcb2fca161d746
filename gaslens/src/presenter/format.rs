//! Text formatting for the optimization report and gas breakdown.

// Percentages and scaled gas figures convert u64 to f64 for display
#![allow(clippy::cast_precision_loss)]

use crossterm::style::{style, Color, Stylize};
use std::collections::BTreeMap;

use super::theme::{severity_heading, share_severity};
use super::PresenterConfig;
use crate::analysis::{Finding, Severity};
use crate::export::Report;

/// Suggestions printed after the findings when there are any.
pub const RECOMMENDATIONS: [&str; 4] = [
    "Review high-priority optimizations first",
    "Consider caching frequently accessed storage values",
    "Batch external calls when possible",
    "Use memory instead of storage for temporary data",
];

/// Compact gas figure: `1.23M`, `4.56K` or the plain integer.
#[must_use]
pub fn format_gas(gas: u64) -> String {
    if gas >= 1_000_000 {
        format!("{:.2}M", gas as f64 / 1_000_000.0)
    } else if gas >= 1_000 {
        format!("{:.2}K", gas as f64 / 1_000.0)
    } else {
        gas.to_string()
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn percentage(part: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| part as f64 / total as f64 * 100.0)
}

/// Renders reports as styled terminal text.
#[derive(Debug, Clone, Default)]
pub struct Presenter {
    config: PresenterConfig,
}

impl Presenter {
    #[must_use]
    pub fn new(config: PresenterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.config.color {
            return text.to_string();
        }
        let styled = style(text).with(color);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    fn banner(&self, out: &mut String, title: &str) {
        let rule = "═".repeat(self.config.rule_width);
        let pad = self.config.rule_width.saturating_sub(title.chars().count()) / 2;
        push_line(out, &self.paint(&rule, self.config.header, true));
        let centered = format!("{}{title}", " ".repeat(pad));
        push_line(out, &self.paint(&centered, self.config.header, true));
        push_line(out, &self.paint(&rule, self.config.header, true));
    }

    fn separator(&self) -> String {
        "─".repeat(self.config.rule_width)
    }

    /// The optimization report: summary, findings by severity, total savings.
    #[must_use]
    pub fn format_findings(&self, findings: &[Finding], total_gas: u64) -> String {
        let mut out = String::from("\n");
        self.banner(&mut out, "GASLENS - GAS OPTIMIZATION REPORT");
        out.push('\n');

        let info = self.config.info;
        let total_line = format!("📊 Total Gas Used: {}", format_gas(total_gas));
        push_line(&mut out, &self.paint(&total_line, info, false));
        let count_line = format!("🔍 Optimizations Found: {}", findings.len());
        push_line(&mut out, &self.paint(&count_line, info, false));
        out.push('\n');

        if findings.is_empty() {
            let success = self.config.success;
            for line in [
                "✨ No obvious optimization opportunities found!",
                "   Your transaction appears to be well-optimized.",
            ] {
                push_line(&mut out, &self.paint(line, success, true));
            }
            out.push('\n');
            return out;
        }

        for severity in Severity::ALL {
            let group: Vec<&Finding> = findings.iter().filter(|f| f.severity == severity).collect();
            if group.is_empty() {
                continue;
            }
            let color = self.config.severity_color(severity);
            let (marker, title) = severity_heading(severity);
            push_line(&mut out, &self.paint(&format!("{marker} {title}"), color, true));
            push_line(&mut out, &self.separator());
            for (index, finding) in group.iter().enumerate() {
                self.format_finding(&mut out, finding, index + 1, color);
            }
            out.push('\n');
        }

        let total_savings = findings.iter().fold(0u64, |acc, f| acc.saturating_add(f.gas_savings));
        if total_savings > 0 {
            if let Some(share) = percentage(total_savings, total_gas) {
                let rule = "═".repeat(self.config.rule_width);
                let line = format!(
                    "💰 Total Potential Savings: {} (~{share:.2}%)",
                    format_gas(total_savings)
                );
                push_line(&mut out, &self.paint(&rule, self.config.header, true));
                push_line(&mut out, &self.paint(&line, self.config.success, true));
                push_line(&mut out, &self.paint(&rule, self.config.header, true));
                out.push('\n');
            }
        }

        out
    }

    fn format_finding(&self, out: &mut String, finding: &Finding, index: usize, color: Color) {
        out.push('\n');
        push_line(out, &self.paint(&format!("{index}. {}", finding.kind), color, true));
        push_line(out, &format!("   Description: {}", finding.description));
        push_line(out, &format!("   Location: {}", finding.location));
        if finding.gas_savings > 0 {
            let savings = format_gas(finding.gas_savings);
            push_line(out, &format!("   💰 Potential Savings: {savings}"));
        }
        if !finding.details.is_empty() {
            out.push_str("   Details:\n");
            for (key, value) in &finding.details {
                push_line(out, &format!("     • {key}: {value}"));
            }
        }
    }

    /// The top opcodes by usage with their share of `total_gas`.
    #[must_use]
    pub fn format_gas_breakdown(
        &self,
        gas_by_opcode: &BTreeMap<String, u64>,
        total_gas: u64,
    ) -> String {
        let mut out = String::from("\n");
        self.banner(&mut out, "GAS USAGE BREAKDOWN");
        out.push('\n');

        let mut rows: Vec<(&String, u64)> =
            gas_by_opcode.iter().map(|(op, &used)| (op, used)).collect();
        // BTreeMap iteration already orders ties by mnemonic; the sort is stable
        rows.sort_by(|a, b| b.1.cmp(&a.1));

        push_line(&mut out, &format!("{:<20} {:>15} {:>10}", "OPCODE", "GAS USED", "% OF TOTAL"));
        push_line(&mut out, &self.separator());

        for (opcode, used) in rows.into_iter().take(self.config.top_n) {
            let share = percentage(used, total_gas).unwrap_or(0.0);
            let row = format!("{opcode:<20} {:>15} {share:>9.2}%", format_gas(used));
            let color = share_severity(share)
                .map_or(self.config.info, |severity| self.config.severity_color(severity));
            let bold = share_severity(share).is_some();
            push_line(&mut out, &self.paint(&row, color, bold));
        }

        out.push('\n');
        out
    }

    /// Follow-up suggestions, empty when there are no findings.
    #[must_use]
    pub fn recommendations(&self, findings: &[Finding]) -> String {
        if findings.is_empty() {
            return String::new();
        }
        let mut out = self.paint("💡 RECOMMENDATIONS:", self.config.success, true);
        out.push('\n');
        for (index, line) in RECOMMENDATIONS.iter().enumerate() {
            push_line(&mut out, &format!("   {}. {line}", index + 1));
        }
        out.push('\n');
        out
    }

    /// Full human-readable rendering of `report`.
    #[must_use]
    pub fn render(&self, report: &Report, breakdown: bool) -> String {
        let mut out = self.format_findings(&report.optimizations, report.total_gas_used);
        if breakdown {
            out.push_str(&self.format_gas_breakdown(&report.gas_by_opcode, report.total_gas_used));
        }
        out.push_str(&self.recommendations(&report.optimizations));
        out
    }
}
