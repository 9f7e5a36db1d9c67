// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MemoryError};
use std::fmt;

/// Half-open `[start, end)` address interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    start: Address,
    end: Address,
}

impl MemoryRange {
    pub fn new(start: Address, end: Address) -> Result<Self, MemoryError> {
        if end < start {
            return Err(MemoryError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn from_start_size(start: Address, size: u64) -> Result<Self, MemoryError> {
        let end = start.checked_add(size).ok_or(MemoryError::InvalidRange)?;
        Self::new(start, end)
    }

    pub(crate) fn spanning(start: Address, len: usize) -> Self {
        let end = Address::new(start.as_u64().saturating_add(len as u64));
        Self { start, end }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end.as_u64() - self.start.as_u64()
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.is_within_range(self.start, self.end)
    }

    /// True when `[addr, addr + len)` lies entirely inside the range.
    pub fn contains_span(&self, addr: Address, len: u64) -> bool {
        match addr.checked_add(len) {
            Some(span_end) => addr >= self.start && span_end <= self.end,
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
