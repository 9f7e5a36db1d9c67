// Mon Oct 19 2026 - Alex

use crate::memory::{Address, ByteImage, MemoryError, MemoryReader};
use crate::pattern::MatchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// x86 control transfers carrying a 32-bit displacement right after the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    NearCall,
    NearJump,
    FarCall,
}

impl BranchKind {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0xe8 => Some(Self::NearCall),
            0xe9 => Some(Self::NearJump),
            0x9a => Some(Self::FarCall),
            _ => None,
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Self::NearCall => 0xe8,
            Self::NearJump => 0xe9,
            Self::FarCall => 0x9a,
        }
    }

    /// Encoded length when it is fixed. A far call also carries a segment
    /// selector, so its length is left to the caller.
    pub fn fixed_length(&self) -> Option<usize> {
        match self {
            Self::NearCall | Self::NearJump => Some(5),
            Self::FarCall => None,
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearCall => write!(f, "call rel32"),
            Self::NearJump => write!(f, "jmp rel32"),
            Self::FarCall => write!(f, "call far"),
        }
    }
}

/// Target of the branch at `at`, expressed in the same space as
/// `virtual_offset` (the virtual address of `at`).
///
/// `instruction_len` overrides the encoded length; it is required for far
/// calls.
pub fn resolve(
    image: &ByteImage,
    at: Address,
    virtual_offset: u64,
    instruction_len: Option<usize>,
) -> Result<u64, MatchError> {
    let opcode = image.read_u8(at)?;
    let kind = BranchKind::from_opcode(opcode)
        .ok_or(MatchError::UnsupportedOpcode { opcode, address: at })?;

    let length = instruction_len
        .or_else(|| kind.fixed_length())
        .ok_or(MatchError::AmbiguousLength { opcode, address: at })?;

    let operand = at.checked_add(1).ok_or(MemoryError::AddressOverflow(at))?;
    let displacement = image.read_i32(operand)?;

    let target = virtual_offset
        .wrapping_add(length as u64)
        .wrapping_add_signed(displacement as i64);

    log::debug!(
        "{} at {} (va {:#x}, len {}) -> {:#x}",
        kind,
        at,
        virtual_offset,
        length,
        target
    );

    Ok(target)
}
