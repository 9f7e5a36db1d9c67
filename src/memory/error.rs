// Mon Oct 19 2026 - Alex

use crate::memory::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Out of bounds: {len} byte(s) at {address} not inside image {start}..{end}")]
    OutOfBounds {
        address: Address,
        len: u64,
        start: Address,
        end: Address,
    },
    #[error("Address arithmetic overflowed at {0}")]
    AddressOverflow(Address),
    #[error("Invalid memory range")]
    InvalidRange,
}

impl MemoryError {
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, MemoryError::OutOfBounds { .. })
    }
}
