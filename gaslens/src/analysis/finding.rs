//! Finding records and the append-only log that holds them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::Location;

/// How urgently a finding deserves attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most urgent first.
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What pattern a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// The same storage slot read more than the threshold allows.
    RedundantSload,
    /// A call forwarding all gas the 63/64 retention rule permits.
    GasForwarding,
    /// Memory grown past the expansion threshold.
    MemoryExpansion,
    /// One instruction accounts for a large share of total usage.
    ExpensiveOpcode,
    /// Enough external calls that batching may pay off.
    MultipleCalls,
}

impl FindingKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::RedundantSload => "redundant_sload",
            FindingKind::GasForwarding => "gas_forwarding",
            FindingKind::MemoryExpansion => "memory_expansion",
            FindingKind::ExpensiveOpcode => "expensive_opcode",
            FindingKind::MultipleCalls => "multiple_calls",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar detail value.
///
/// Serialized untagged, so a report reads `"read_count": 3` rather than a
/// wrapped variant. Deserialization tries integer, then float, then string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailValue::Integer(n) => write!(f, "{n}"),
            DetailValue::Float(x) => write!(f, "{x}"),
            DetailValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for DetailValue {
    fn from(n: u64) -> Self {
        DetailValue::Integer(n)
    }
}

impl From<usize> for DetailValue {
    fn from(n: usize) -> Self {
        DetailValue::Integer(u64::try_from(n).unwrap_or(u64::MAX))
    }
}

impl From<f64> for DetailValue {
    fn from(x: f64) -> Self {
        DetailValue::Float(x)
    }
}

impl From<String> for DetailValue {
    fn from(s: String) -> Self {
        DetailValue::Text(s)
    }
}

impl From<&str> for DetailValue {
    fn from(s: &str) -> Self {
        DetailValue::Text(s.to_owned())
    }
}

/// One detected optimization opportunity.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub severity: Severity,
    pub description: String,
    pub location: Location,
    /// Best-effort estimate; zero when no saving is claimed.
    pub gas_savings: u64,
    /// Sorted by key so serialized output is stable.
    pub details: BTreeMap<String, DetailValue>,
}

impl Finding {
    #[must_use]
    pub fn new(
        kind: FindingKind,
        severity: Severity,
        description: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
            location,
            gas_savings: 0,
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_savings(mut self, gas_savings: u64) -> Self {
        self.gas_savings = gas_savings;
        self
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<DetailValue>) -> Self {
        self.details.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&DetailValue> {
        self.details.get(key)
    }
}

/// Append-only findings log.
///
/// Recorded findings are never reordered, edited or removed; callers only
/// ever get shared views or clones.
#[derive(Debug, Clone, Default)]
pub struct FindingsLog {
    entries: Vec<Finding>,
}

impl FindingsLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.entries.push(finding);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Finding] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<Finding> for FindingsLog {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
