//! Deterministic gas-usage heuristics.
//!
//! The detector is consulted at two kinds of trigger point:
//!
//! - **Per step**, from inside the tracer's step handler, against the
//!   aggregate the step just updated (`check_*` methods).
//! - **Once at `TxEnd`**, over the finished aggregates ([`PatternDetector::terminal_pass`]).
//!
//! It never mutates state; it only builds [`Finding`]s for the tracer to
//! append.
//!
//! ## Findings
//!
//! | Kind               | Trigger                                   | Severity |
//! |--------------------|-------------------------------------------|----------|
//! | `redundant_sload`  | slot read count > threshold, every time   | high     |
//! | `gas_forwarding`   | forwarded gas == gas − gas/64             | low      |
//! | `memory_expansion` | memory size > threshold, every step       | medium   |
//! | `expensive_opcode` | opcode usage > total / divisor (at end)   | medium   |
//! | `multiple_calls`   | call count > threshold (at end)           | medium   |

// Percentage calculations intentionally convert u64 to f64
#![allow(clippy::cast_precision_loss)]

use gaslens_common::{StepEvent, U256};

use super::finding::{Finding, FindingKind, Severity};
use crate::classification::OpcodeCategory;
use crate::config::AnalyzerConfig;
use crate::domain::{Location, SlotKey};
use crate::tracer::{CallOperation, RunningState};

pub const REDUNDANT_SLOAD_DESCRIPTION: &str = "Multiple SLOAD operations for the same storage slot";
pub const GAS_FORWARDING_DESCRIPTION: &str = "Forwarding all available gas to external call";
pub const MEMORY_EXPANSION_DESCRIPTION: &str = "Large memory expansion detected";
pub const EXPENSIVE_OPCODE_DESCRIPTION: &str = "Opcode consumes significant gas";
pub const MULTIPLE_CALLS_DESCRIPTION: &str = "Multiple external calls detected - consider batching";

pub const CREATE_DESCRIPTION: &str = "Contract creation is expensive";
pub const SELFDESTRUCT_DESCRIPTION: &str = "SELFDESTRUCT is very expensive";
pub const LARGE_LOG_DESCRIPTION: &str = "Large LOG operation";
pub const EXPENSIVE_HASH_DESCRIPTION: &str = "Expensive KECCAK256 operation";

/// Most gas a call can forward under the 63/64 retention rule, given `gas` remaining.
#[must_use]
pub fn max_forwardable_gas(gas: u64) -> u64 {
    gas - gas / 64
}

/// Evaluates heuristics against running aggregates.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: AnalyzerConfig,
}

impl PatternDetector {
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Flag a storage read whose running count passed the threshold.
    ///
    /// Fires on every qualifying read, not once per slot: the fourth read
    /// of a slot produces a second finding with a larger savings estimate.
    #[must_use]
    pub fn check_storage_read(&self, pc: u64, slot: &SlotKey, read_count: u64) -> Option<Finding> {
        if read_count <= self.config.redundant_read_threshold {
            return None;
        }

        let savings = (read_count - 1).saturating_mul(self.config.warm_read_cost);
        Some(
            Finding::new(
                FindingKind::RedundantSload,
                Severity::High,
                REDUNDANT_SLOAD_DESCRIPTION,
                Location::from(pc),
            )
            .with_savings(savings)
            .with_detail("storage_key", slot.to_string())
            .with_detail("read_count", read_count),
        )
    }

    /// Flag a call that forwards exactly the maximum the retention rule allows.
    ///
    /// `forwarded` is the gas operand of the call; `gas` is the gas remaining
    /// when the call instruction executed. Operands wider than 64 bits never
    /// match. The callee is reported in EIP-55 checksummed form.
    #[must_use]
    pub fn check_gas_forwarding(&self, forwarded: &U256, call: &CallOperation) -> Option<Finding> {
        if u64::try_from(*forwarded).ok() != Some(max_forwardable_gas(call.gas)) {
            return None;
        }

        let to = call.to.map(|addr| addr.to_checksum(None)).unwrap_or_default();
        Some(
            Finding::new(
                FindingKind::GasForwarding,
                Severity::Low,
                GAS_FORWARDING_DESCRIPTION,
                Location::from(call.pc),
            )
            .with_detail("call_type", call.op.mnemonic())
            .with_detail("to", to),
        )
    }

    /// Flag a step that left memory above the expansion threshold.
    ///
    /// Not deduplicated: every qualifying step yields a finding.
    #[must_use]
    pub fn check_memory_expansion(&self, pc: u64, memory_size: u64) -> Option<Finding> {
        if memory_size <= self.config.memory_expansion_threshold {
            return None;
        }

        Some(
            Finding::new(
                FindingKind::MemoryExpansion,
                Severity::Medium,
                MEMORY_EXPANSION_DESCRIPTION,
                Location::from(pc),
            )
            .with_detail("memory_size", memory_size),
        )
    }

    /// Description under which `step` is recorded as an expensive operation,
    /// or `None` if it does not qualify.
    #[must_use]
    pub fn expensive_operation(
        &self,
        category: OpcodeCategory,
        step: &StepEvent,
    ) -> Option<&'static str> {
        match category {
            OpcodeCategory::Create => Some(CREATE_DESCRIPTION),
            OpcodeCategory::SelfDestruct => Some(SELFDESTRUCT_DESCRIPTION),
            OpcodeCategory::Log if step.cost > self.config.large_log_cost => {
                Some(LARGE_LOG_DESCRIPTION)
            }
            OpcodeCategory::Hash if step.cost > self.config.expensive_hash_cost => {
                Some(EXPENSIVE_HASH_DESCRIPTION)
            }
            _ => None,
        }
    }

    /// End-of-trace analysis over the finished aggregates.
    ///
    /// Returns hot-opcode findings in mnemonic order, followed by the
    /// batch-call finding if triggered. With zero total usage no hot-opcode
    /// findings are produced.
    #[must_use]
    pub fn terminal_pass(&self, state: &RunningState) -> Vec<Finding> {
        let mut findings = self.hot_opcodes(state);
        findings.extend(self.batch_calls(state));
        findings
    }

    fn hot_opcodes(&self, state: &RunningState) -> Vec<Finding> {
        let total = state.total_gas_used();
        if total == 0 {
            return Vec::new();
        }
        let Some(cutoff) = total.checked_div(self.config.hot_opcode_divisor) else {
            return Vec::new();
        };

        state
            .gas_per_opcode()
            .iter()
            .filter(|&(_, &used)| used > cutoff)
            .map(|(opcode, &used)| {
                let percentage = used as f64 / total as f64 * 100.0;
                Finding::new(
                    FindingKind::ExpensiveOpcode,
                    Severity::Medium,
                    EXPENSIVE_OPCODE_DESCRIPTION,
                    Location::Multiple,
                )
                .with_detail("opcode", opcode.as_str())
                .with_detail("gas_used", used)
                .with_detail("percentage", percentage)
            })
            .collect()
    }

    fn batch_calls(&self, state: &RunningState) -> Option<Finding> {
        let call_count = state.call_ops().len();
        if call_count <= self.config.batch_call_threshold {
            return None;
        }

        let savings = u64::try_from(call_count)
            .unwrap_or(u64::MAX)
            .saturating_mul(self.config.base_call_cost);
        Some(
            Finding::new(
                FindingKind::MultipleCalls,
                Severity::Medium,
                MULTIPLE_CALLS_DESCRIPTION,
                Location::Multiple,
            )
            .with_savings(savings)
            .with_detail("call_count", call_count),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DetailValue;
    use gaslens_common::OpCode;

    fn detector() -> PatternDetector {
        PatternDetector::new(AnalyzerConfig::default())
    }

    fn call_at(pc: u64, gas: u64) -> CallOperation {
        CallOperation { pc, op: OpCode::CALL, to: None, gas, cost: 100, depth: 1 }
    }

    #[test]
    fn test_storage_read_below_threshold_is_quiet() {
        let slot = SlotKey::from(U256::from(1));
        assert!(detector().check_storage_read(0, &slot, 1).is_none());
        assert!(detector().check_storage_read(0, &slot, 2).is_none());
    }

    #[test]
    fn test_storage_read_savings_scale_with_count() {
        let slot = SlotKey::from(U256::from(1));
        let third = detector().check_storage_read(5, &slot, 3).unwrap();
        let fourth = detector().check_storage_read(5, &slot, 4).unwrap();

        assert_eq!(third.gas_savings, 200);
        assert_eq!(fourth.gas_savings, 300);
        assert_eq!(third.severity, Severity::High);
        assert_eq!(third.detail("read_count"), Some(&DetailValue::Integer(3)));
        assert_eq!(third.location.to_string(), "0x05");
    }

    #[test]
    fn test_gas_forwarding_exact_match_only() {
        let call = call_at(10, 6400);
        let all = U256::from(max_forwardable_gas(6400));
        let less = U256::from(max_forwardable_gas(6400) - 1);

        let finding = detector().check_gas_forwarding(&all, &call).unwrap();
        assert_eq!(finding.severity, Severity::Low);
        assert_eq!(finding.gas_savings, 0);
        assert_eq!(finding.detail("call_type"), Some(&DetailValue::Text("CALL".to_string())));
        assert!(detector().check_gas_forwarding(&less, &call).is_none());
        assert!(detector().check_gas_forwarding(&U256::MAX, &call).is_none());
    }

    #[test]
    fn test_gas_forwarding_reports_checksummed_callee() {
        let mut call = call_at(0, 6400);
        call.to = Some("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap());
        let forwarded = U256::from(max_forwardable_gas(6400));

        let finding = detector().check_gas_forwarding(&forwarded, &call).unwrap();
        assert_eq!(
            finding.detail("to"),
            Some(&DetailValue::Text("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string()))
        );
    }

    #[test]
    fn test_max_forwardable_gas() {
        assert_eq!(max_forwardable_gas(6400), 6300);
        assert_eq!(max_forwardable_gas(63), 63);
        assert_eq!(max_forwardable_gas(0), 0);
    }

    #[test]
    fn test_memory_expansion_threshold_is_strict() {
        assert!(detector().check_memory_expansion(0, 10_000).is_none());
        let finding = detector().check_memory_expansion(0, 10_001).unwrap();
        assert_eq!(finding.detail("memory_size"), Some(&DetailValue::Integer(10_001)));
    }

    #[test]
    fn test_expensive_operation_thresholds() {
        let d = detector();
        let cheap_log = StepEvent::new(0, OpCode::LOG2, 0, 1000, 1);
        let big_log = StepEvent::new(0, OpCode::LOG2, 0, 1001, 1);
        let cheap_hash = StepEvent::new(0, OpCode::KECCAK256, 0, 500, 1);
        let hash = StepEvent::new(0, OpCode::KECCAK256, 0, 501, 1);
        let create = StepEvent::new(0, OpCode::CREATE, 0, 0, 1);
        let selfdestruct = StepEvent::new(0, OpCode::SELFDESTRUCT, 0, 5000, 1);

        assert_eq!(d.expensive_operation(OpcodeCategory::Log, &cheap_log), None);
        assert_eq!(
            d.expensive_operation(OpcodeCategory::Log, &big_log),
            Some(LARGE_LOG_DESCRIPTION)
        );
        assert_eq!(d.expensive_operation(OpcodeCategory::Hash, &cheap_hash), None);
        assert_eq!(
            d.expensive_operation(OpcodeCategory::Hash, &hash),
            Some(EXPENSIVE_HASH_DESCRIPTION)
        );
        assert_eq!(
            d.expensive_operation(OpcodeCategory::Create, &create),
            Some(CREATE_DESCRIPTION)
        );
        assert_eq!(
            d.expensive_operation(OpcodeCategory::SelfDestruct, &selfdestruct),
            Some(SELFDESTRUCT_DESCRIPTION)
        );
    }

    #[test]
    fn test_terminal_pass_on_empty_state() {
        let state = RunningState::new();
        assert!(detector().terminal_pass(&state).is_empty());
    }

    #[test]
    fn test_hot_opcodes_in_mnemonic_order() {
        let mut state = RunningState::new();
        state.charge(OpCode::SSTORE, 5000);
        state.charge(OpCode::CALL, 3000);
        state.charge(OpCode::PUSH1, 3);

        let findings = detector().terminal_pass(&state);
        let opcodes: Vec<String> =
            findings.iter().filter_map(|f| f.detail("opcode")).map(ToString::to_string).collect();
        assert_eq!(opcodes, vec!["CALL", "SSTORE"]);
        assert!(findings.iter().all(|f| f.location == Location::Multiple));
    }

    #[test]
    fn test_batch_calls_after_hot_opcodes() {
        let mut state = RunningState::new();
        state.charge(OpCode::CALL, 600);
        for pc in 0..6 {
            state.call_ops.push(call_at(pc, 1000));
        }

        let findings = detector().terminal_pass(&state);
        let last = findings.last().unwrap();
        assert_eq!(last.kind, FindingKind::MultipleCalls);
        assert_eq!(last.gas_savings, 6 * 2100);
        assert_eq!(findings[0].kind, FindingKind::ExpensiveOpcode);
    }
}
