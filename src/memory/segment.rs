// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MemoryRange};
use std::fmt;

/// Search window handed to the scanner. Unset bounds fall back to the
/// image bounds when the segment is clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segment {
    start: Option<Address>,
    end: Option<Address>,
}

impl Segment {
    pub fn new(start: Option<Address>, end: Option<Address>) -> Self {
        Self { start, end }
    }

    pub fn between(start: Address, end: Address) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn starting_at(start: Address) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn until(end: Address) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<Address> {
        self.start
    }

    pub fn end(&self) -> Option<Address> {
        self.end
    }

    /// Resolves the segment against the image bounds. The upper bound is
    /// pulled back to the last valid byte of the image, never one past it.
    /// Returns `None` for an empty image.
    pub fn clamp(&self, bounds: &MemoryRange) -> Option<(Address, Address)> {
        if bounds.is_empty() {
            return None;
        }

        let last = bounds.end() - 1;

        let start = match self.start {
            Some(start) if start > bounds.start() => start,
            _ => bounds.start(),
        };

        let end = match self.end {
            Some(end) if end < last => end,
            _ => last,
        };

        Some((start, end))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_bound = |bound: Option<Address>| match bound {
            Some(addr) => format!("{:#x}", addr.as_u64()),
            None => "*".to_string(),
        };
        write!(f, "[{}, {}]", fmt_bound(self.start), fmt_bound(self.end))
    }
}
