//! Instruction classification for category-specific analysis.
//!
//! Every step is charged to the per-instruction usage map, but only a few
//! instruction families get extra bookkeeping. This module maps an
//! [`OpCode`] to the family that decides which records a step produces.
//!
//! # Operand Positions
//!
//! Operands are read from the step's captured stack, index 0 = top:
//!
//! | Family         | Operand 0        | Operand 1 |
//! |----------------|------------------|-----------|
//! | `StorageRead`  | slot key         |           |
//! | `StorageWrite` | slot key         |           |
//! | `ExternalCall` | forwarded gas    | callee    |

use gaslens_common::OpCode;

/// Instruction family used to route per-step analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpcodeCategory {
    /// Persistent storage read (`SLOAD`)
    StorageRead,
    /// Persistent storage write (`SSTORE`)
    StorageWrite,
    /// Memory load/store (`MLOAD`, `MSTORE`, `MSTORE8`)
    Memory,
    /// Message call family (`CALL`, `CALLCODE`, `DELEGATECALL`, `STATICCALL`)
    ExternalCall,
    /// Contract creation (`CREATE`, `CREATE2`)
    Create,
    /// `SELFDESTRUCT`
    SelfDestruct,
    /// Log emission (`LOG0`..`LOG4`)
    Log,
    /// `KECCAK256`
    Hash,
    /// Everything else
    #[default]
    Other,
}

/// Stack position of the slot key for storage instructions.
pub const STORAGE_KEY_OPERAND: usize = 0;

/// Stack position of the forwarded gas for call instructions.
pub const CALL_GAS_OPERAND: usize = 0;

/// Stack position of the callee address for call instructions.
pub const CALL_TARGET_OPERAND: usize = 1;

// =============================================================================
// CLASSIFICATION TABLES
// =============================================================================

const MEMORY_OPS: &[OpCode] = &[OpCode::MLOAD, OpCode::MSTORE, OpCode::MSTORE8];

const CALL_OPS: &[OpCode] =
    &[OpCode::CALL, OpCode::CALLCODE, OpCode::DELEGATECALL, OpCode::STATICCALL];

const CREATE_OPS: &[OpCode] = &[OpCode::CREATE, OpCode::CREATE2];

const LOG_OPS: &[OpCode] = &[OpCode::LOG0, OpCode::LOG1, OpCode::LOG2, OpCode::LOG3, OpCode::LOG4];

/// Classify an instruction into the family that drives per-step analysis.
#[must_use]
pub fn classify_opcode(op: OpCode) -> OpcodeCategory {
    match op {
        OpCode::SLOAD => OpcodeCategory::StorageRead,
        OpCode::SSTORE => OpcodeCategory::StorageWrite,
        OpCode::SELFDESTRUCT => OpcodeCategory::SelfDestruct,
        OpCode::KECCAK256 => OpcodeCategory::Hash,
        _ => [
            (MEMORY_OPS, OpcodeCategory::Memory),
            (CALL_OPS, OpcodeCategory::ExternalCall),
            (CREATE_OPS, OpcodeCategory::Create),
            (LOG_OPS, OpcodeCategory::Log),
        ]
        .into_iter()
        .find(|(family, _)| family.contains(&op))
        .map_or(OpcodeCategory::Other, |(_, category)| category),
    }
}
