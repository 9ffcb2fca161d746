//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep program counters, finding locations and
//! storage slot identities from being confused with plain integers or
//! strings, and own their canonical textual renderings.

use gaslens_common::{B256, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Program counter within the executing code.
///
/// Rendered as `0x` followed by the minimal big-endian byte encoding, so
/// byte boundaries are always visible: `0` → `0x`, `42` → `0x2a`,
/// `256` → `0x0100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pc(pub u64);

impl fmt::Display for Pc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        let bytes = self.0.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        for byte in &bytes[first..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Where a finding applies: one instruction, or the trace as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Pc(Pc),
    Multiple,
}

impl Location {
    const MULTIPLE: &'static str = "multiple";
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Pc(pc) => fmt::Display::fmt(pc, f),
            Location::Multiple => f.write_str(Self::MULTIPLE),
        }
    }
}

impl From<u64> for Location {
    fn from(pc: u64) -> Self {
        Location::Pc(Pc(pc))
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == Self::MULTIPLE {
            return Ok(Location::Multiple);
        }
        let digits = raw
            .strip_prefix("0x")
            .ok_or_else(|| de::Error::custom(format!("invalid location {raw:?}")))?;
        if digits.is_empty() {
            return Ok(Location::Pc(Pc(0)));
        }
        u64::from_str_radix(digits, 16)
            .map(|pc| Location::Pc(Pc(pc)))
            .map_err(|e| de::Error::custom(format!("invalid location {raw:?}: {e}")))
    }
}

/// Storage slot identity
///
/// Wraps the full 32-byte key so two reads of the same slot always map to
/// the same entry regardless of how the operand was encoded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey(B256);

impl SlotKey {
    #[must_use]
    pub fn as_bytes(&self) -> &B256 {
        &self.0
    }
}

impl From<U256> for SlotKey {
    fn from(word: U256) -> Self {
        SlotKey(B256::from(word.to_be_bytes::<32>()))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
