// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MemoryError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Malformed pattern '{pattern}': {reason}")]
    Malformed { pattern: String, reason: String },
    #[error("Pattern is empty")]
    Empty,
}

impl PatternError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        PatternError::Malformed {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("No active candidate: the previous step matched nothing")]
    NoActiveCandidate,
    #[error("Candidate index {index} out of range ({len} candidate(s))")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Unsupported opcode {opcode:#04x} at {address}")]
    UnsupportedOpcode { opcode: u8, address: Address },
    #[error("Opcode {opcode:#04x} at {address} has no fixed instruction length; pass it explicitly")]
    AmbiguousLength { opcode: u8, address: Address },
}

impl MatchError {
    pub fn is_no_active_candidate(&self) -> bool {
        matches!(self, MatchError::NoActiveCandidate)
    }
}
