//! Running aggregates for one traced execution.
//!
//! A [`RunningState`] is created when the trace starts, mutated strictly in
//! event order by the [`GasTracer`](super::GasTracer) handlers, finalized
//! once at `TxEnd`, then read through the report builder and discarded.
//!
//! # Usage Accounting
//!
//! `total_gas_used` is a provisional live counter while the trace runs: every
//! step adds its cost and every frame exit adds its reported usage. `TxEnd`
//! overwrites it wholesale with the interpreter's final figure, which is the
//! authoritative total. The two can disagree; that difference is preserved.

use gaslens_common::{Address, OpCode};
use std::collections::{BTreeMap, HashMap};

use crate::analysis::{Finding, FindingsLog};
use crate::domain::SlotKey;

/// Lifecycle of one trace.
///
/// ```text
/// Idle ──TxStart──▶ Started ──Enter/Step──▶ Running ──TxEnd──▶ Ended
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Started,
    Running,
    Ended,
}

impl Phase {
    /// Returns true once `TxEnd` has been processed.
    #[must_use]
    pub fn is_ended(self) -> bool {
        matches!(self, Phase::Ended)
    }
}

/// A memory load or store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOperation {
    pub pc: u64,
    pub op: OpCode,
    pub memory_size: u64,
    pub cost: u64,
    pub depth: u64,
}

/// A message call issued by a call-family instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOperation {
    pub pc: u64,
    pub op: OpCode,
    /// Callee, when the operand was captured.
    pub to: Option<Address>,
    /// Gas remaining when the call executed.
    pub gas: u64,
    pub cost: u64,
    pub depth: u64,
}

/// An instruction recorded for its cost profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpensiveOperation {
    pub pc: u64,
    pub op: OpCode,
    pub cost: u64,
    pub description: &'static str,
    pub depth: u64,
}

/// A faulting instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    pub pc: u64,
    pub op: OpCode,
    pub depth: u64,
    pub error: Option<String>,
}

/// Position of the most recent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCursor {
    pub pc: u64,
    pub gas: u64,
    /// Depth as reported by the interpreter on the step itself.
    pub depth: u64,
}

/// Aggregates accumulated over one trace.
#[derive(Debug, Default)]
pub struct RunningState {
    pub(crate) phase: Phase,
    pub(crate) gas_limit: u64,
    pub(crate) cursor: StepCursor,

    /// Frame depth maintained by Enter/Exit, never below zero.
    pub(crate) depth: u64,

    pub(crate) total_gas_used: u64,
    pub(crate) gas_per_opcode: BTreeMap<String, u64>,

    pub(crate) storage_reads: HashMap<SlotKey, u64>,
    pub(crate) storage_writes: HashMap<SlotKey, u64>,
    pub(crate) memory_ops: Vec<MemoryOperation>,
    pub(crate) call_ops: Vec<CallOperation>,
    pub(crate) expensive_ops: Vec<ExpensiveOperation>,
    pub(crate) faults: Vec<FaultRecord>,

    pub(crate) findings: FindingsLog,

    /// Events rejected because they arrived after `TxEnd`.
    pub(crate) ignored_events: u64,

    /// Exits that arrived with no open frame.
    pub(crate) unmatched_exits: u64,
}

impl RunningState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the read count for `slot`, returning the new count.
    pub(crate) fn record_read(&mut self, slot: SlotKey) -> u64 {
        let count = self.storage_reads.entry(slot).or_insert(0);
        *count += 1;
        *count
    }

    /// Increment the write count for `slot`, returning the new count.
    pub(crate) fn record_write(&mut self, slot: SlotKey) -> u64 {
        let count = self.storage_writes.entry(slot).or_insert(0);
        *count += 1;
        *count
    }

    /// Charge `cost` to `op` and to the live total.
    pub(crate) fn charge(&mut self, op: OpCode, cost: u64) {
        self.total_gas_used = self.total_gas_used.saturating_add(cost);
        let used = self.gas_per_opcode.entry(op.mnemonic()).or_insert(0);
        *used = used.saturating_add(cost);
    }

    pub(crate) fn record_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    #[must_use]
    pub fn cursor(&self) -> StepCursor {
        self.cursor
    }

    #[must_use]
    pub fn depth(&self) -> u64 {
        self.depth
    }

    #[must_use]
    pub fn total_gas_used(&self) -> u64 {
        self.total_gas_used
    }

    #[must_use]
    pub fn gas_per_opcode(&self) -> &BTreeMap<String, u64> {
        &self.gas_per_opcode
    }

    /// Number of times `slot` has been read so far.
    #[must_use]
    pub fn read_count(&self, slot: &SlotKey) -> u64 {
        self.storage_reads.get(slot).copied().unwrap_or(0)
    }

    /// Number of times `slot` has been written so far.
    #[must_use]
    pub fn write_count(&self, slot: &SlotKey) -> u64 {
        self.storage_writes.get(slot).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn distinct_slots_read(&self) -> usize {
        self.storage_reads.len()
    }

    #[must_use]
    pub fn distinct_slots_written(&self) -> usize {
        self.storage_writes.len()
    }

    #[must_use]
    pub fn memory_ops(&self) -> &[MemoryOperation] {
        &self.memory_ops
    }

    #[must_use]
    pub fn call_ops(&self) -> &[CallOperation] {
        &self.call_ops
    }

    #[must_use]
    pub fn expensive_ops(&self) -> &[ExpensiveOperation] {
        &self.expensive_ops
    }

    #[must_use]
    pub fn faults(&self) -> &[FaultRecord] {
        &self.faults
    }

    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        self.findings.as_slice()
    }

    #[must_use]
    pub fn ignored_events(&self) -> u64 {
        self.ignored_events
    }

    #[must_use]
    pub fn unmatched_exits(&self) -> u64 {
        self.unmatched_exits
    }
}
