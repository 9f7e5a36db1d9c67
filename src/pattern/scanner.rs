// Mon Oct 19 2026 - Alex

use crate::memory::{Address, ByteImage, MemoryReader, Segment};
use crate::pattern::{Pattern, PatternError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Scans `segment` of `image` for every occurrence of `pattern`.
///
/// The segment is clamped first: a missing or too-low start becomes the
/// image start, a missing or too-high end becomes the image's last byte.
///
/// Forward scans try every start in `[start, end)` and return them
/// ascending. A match near `end` only has to hold on the bytes before
/// `end`; the overrunning tail of the pattern is not compared.
///
/// Backward scans try every start in `(start, end]` and return them
/// descending. Their tail is compared up to the end of the image.
///
/// Overlapping matches are all reported.
pub fn search(
    image: &ByteImage,
    pattern: &Pattern,
    segment: Segment,
    direction: Direction,
) -> Result<Vec<Address>, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let bounds = image.bounds();
    let Some((start, end)) = segment.clamp(&bounds) else {
        return Ok(Vec::new());
    };
    if end < start {
        return Ok(Vec::new());
    }

    let base = bounds.start();
    let data = image.as_slice();
    let first = (start.as_u64() - base.as_u64()) as usize;
    let last = (end.as_u64() - base.as_u64()) as usize;

    let offsets = match direction {
        Direction::Forward => scan_forward(data, pattern, first, last),
        Direction::Backward => scan_backward(data, pattern, first, last),
    };

    log::trace!(
        "{} scan of {} over {} -> {} match(es)",
        direction,
        pattern,
        Segment::between(start, end),
        offsets.len()
    );

    Ok(offsets.into_iter().map(|offset| base + offset as u64).collect())
}

fn scan_forward(data: &[u8], pattern: &Pattern, first: usize, last: usize) -> Vec<usize> {
    if first >= last {
        return Vec::new();
    }
    (first..last)
        .filter(|&at| matches_at(data, pattern, at, last))
        .collect()
}

fn scan_backward(data: &[u8], pattern: &Pattern, first: usize, last: usize) -> Vec<usize> {
    if last <= first {
        return Vec::new();
    }
    (first + 1..=last)
        .rev()
        .filter(|&at| matches_at(data, pattern, at, data.len()))
        .collect()
}

/// Compares `pattern` at `at`, stopping silently at `limit`.
#[inline]
fn matches_at(data: &[u8], pattern: &Pattern, at: usize, limit: usize) -> bool {
    for index in 0..pattern.len() {
        let pos = at + index;
        if pos >= limit {
            break;
        }
        if !pattern.matches_byte(index, data[pos]) {
            return false;
        }
    }
    true
}
