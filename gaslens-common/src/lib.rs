//! # Shared Event Model (Interpreter ↔ Analyzer)
//!
//! Defines the events an instruction-level interpreter emits while replaying
//! one transaction, and the fixed-width values they carry. Interpreter
//! adapters produce these; the `gaslens` analyzer consumes them in order.
//!
//! ## Event Order
//!
//! A well-formed trace is:
//!
//! ```text
//! TxStart
//!   Step*  (Enter Step* Exit)*  Fault?
//! TxEnd
//! ```
//!
//! Every `Enter` is matched by exactly one `Exit`, nested calls are strictly
//! bracketed, and `TxEnd` arrives exactly once.
//!
//! ## Key Types
//!
//! - [`ExecutionEvent`] - One entry in the ordered event stream
//! - [`StepEvent`] - Per-instruction payload (pc, cost, stack operands, memory size)
//! - [`CallFrame`] / [`FrameExit`] - Nested call frame boundaries
//! - [`OpCode`] - Instruction byte and mnemonic
//!
//! Stack words are [`U256`] and account addresses are [`Address`], both
//! re-exported from `alloy-primitives`.
//!
//! The `serde` feature adds (de)serialization for recorded traces.

mod opcode;

pub use alloy_primitives::{Address, B256, U256};
pub use opcode::{OpCode, ParseOpCodeError};

// ============================================================================
// Event Payloads
// ============================================================================

/// One executed instruction.
///
/// Also used for `Fault` events, where `error` describes the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepEvent {
    /// Program counter of the instruction within the executing code.
    pub pc: u64,

    /// The instruction executed.
    pub op: OpCode,

    /// Gas remaining before the instruction executed.
    pub gas: u64,

    /// Gas charged for this instruction.
    pub cost: u64,

    /// Call depth as reported by the interpreter (1 = top-level frame).
    pub depth: u64,

    /// Operand words copied from the top of the data stack.
    ///
    /// **Order**: index 0 is the top of the stack. The interpreter may copy
    /// fewer words than the instruction consumes; analyses that need a
    /// missing operand skip that instruction.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub stack: Vec<U256>,

    /// Size of the frame's memory in bytes after the instruction.
    #[cfg_attr(feature = "serde", serde(default))]
    pub memory_size: u64,

    /// Interpreter error attached to this step, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl StepEvent {
    /// A step with no operands, no memory and no error.
    #[must_use]
    pub fn new(pc: u64, op: OpCode, gas: u64, cost: u64, depth: u64) -> Self {
        Self { pc, op, gas, cost, depth, stack: Vec::new(), memory_size: 0, error: None }
    }

    /// Set the operand words, top of stack first.
    #[must_use]
    pub fn with_stack(mut self, stack: Vec<U256>) -> Self {
        self.stack = stack;
        self
    }

    #[must_use]
    pub fn with_memory_size(mut self, memory_size: u64) -> Self {
        self.memory_size = memory_size;
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The `n`th operand from the top of the stack, if it was captured.
    #[must_use]
    pub fn operand(&self, n: usize) -> Option<&U256> {
        self.stack.get(n)
    }
}

/// A nested call frame being entered.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallFrame {
    /// The call-family or creation instruction that opened the frame.
    pub call_type: OpCode,

    #[cfg_attr(feature = "serde", serde(default))]
    pub from: Address,

    #[cfg_attr(feature = "serde", serde(default))]
    pub to: Address,

    /// Gas made available to the frame.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gas: u64,

    /// Value transferred, when the call carries one.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<U256>,
}

/// A nested call frame returning to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameExit {
    /// Gas consumed by the frame.
    pub gas_used: u64,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

// ============================================================================
// Event Stream
// ============================================================================

/// One entry in the ordered stream a traced execution produces.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum ExecutionEvent {
    /// Transaction begins with the given gas limit.
    TxStart { gas_limit: u64 },

    /// A nested call frame is entered.
    Enter(CallFrame),

    /// One instruction executed.
    Step(StepEvent),

    /// A nested call frame returned.
    Exit(FrameExit),

    /// An instruction faulted.
    Fault(StepEvent),

    /// Transaction finished; `gas_used` is the authoritative total.
    TxEnd { gas_used: u64 },
}

impl ExecutionEvent {
    /// Short lowercase name of the event kind, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionEvent::TxStart { .. } => "tx_start",
            ExecutionEvent::Enter(_) => "enter",
            ExecutionEvent::Step(_) => "step",
            ExecutionEvent::Exit(_) => "exit",
            ExecutionEvent::Fault(_) => "fault",
            ExecutionEvent::TxEnd { .. } => "tx_end",
        }
    }
}
