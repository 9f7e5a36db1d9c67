// Mon Oct 19 2026 - Alex

use crate::memory::{Address, ByteImage, Segment};
use crate::pattern::{search, Direction, MatchError, Pattern};
use itertools::Itertools;
use once_cell::sync::Lazy;

pub const DEFAULT_PROCEDURE_WINDOW: usize = 10000;

pub const PADDING_BYTE: u8 = 0xcc;

/// push ebp; mov ebp, esp
static FRAME_PROLOGUE: Lazy<Pattern> = Lazy::new(|| Pattern::from_bytes(&[0x55, 0x8b, 0xec]));

/// int3 filler emitted between functions
static INT3_PADDING: Lazy<Pattern> = Lazy::new(|| Pattern::from_bytes(&[PADDING_BYTE, PADDING_BYTE]));

/// Probable starts of the procedure containing `active`, closest first.
///
/// Looks back at most `window` bytes for frame prologues and for the first
/// real byte after int3 padding. Best effort: several boundaries may come
/// back and none of them is guaranteed to be the true entry.
pub fn procedure_starts(
    image: &ByteImage,
    active: Address,
    window: usize,
) -> Result<Vec<Address>, MatchError> {
    let segment = Segment::between(active.saturating_sub(window as u64), active);

    let prologues = search(image, &FRAME_PROLOGUE, segment, Direction::Backward)?;
    let paddings = search(image, &INT3_PADDING, segment, Direction::Backward)?;

    let mut after_padding = Vec::with_capacity(paddings.len());
    for padding in paddings {
        if let Some(code) = first_code_byte(image, padding, active)? {
            after_padding.push(code);
        }
    }

    log::debug!(
        "Procedure scan before {}: {} prologue(s), {} padding run(s)",
        active,
        prologues.len(),
        after_padding.len()
    );

    Ok(prologues
        .into_iter()
        .chain(after_padding)
        .sorted_by(|a, b| b.cmp(a))
        .dedup()
        .collect())
}

/// Walks forward over int3 bytes from `from`, giving up at `stop`.
fn first_code_byte(
    image: &ByteImage,
    from: Address,
    stop: Address,
) -> Result<Option<Address>, MatchError> {
    let mut cursor = from;
    while cursor < stop {
        if image.byte_at(cursor)? != PADDING_BYTE {
            return Ok(Some(cursor));
        }
        cursor = cursor + 1;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(image: &ByteImage, hits: &[Address]) -> Vec<u64> {
        hits.iter().map(|a| a.as_u64() - image.start().as_u64()).collect()
    }

    #[test]
    fn test_prologue_and_padding_candidates_merge_descending() {
        let bytes = [
            0x90u8, 0x55, 0x8b, 0xec, 0x90, 0xc3, 0xcc, 0xcc, 0xcc, 0x53, 0x56, 0x90, 0x90, 0x90,
        ];
        let image = ByteImage::from_memory(&bytes);
        let active = image.start() + 12;
        let starts = procedure_starts(&image, active, DEFAULT_PROCEDURE_WINDOW).unwrap();
        assert_eq!(raw(&image, &starts), vec![9, 1]);
    }

    #[test]
    fn test_padding_running_into_active_is_dropped() {
        let bytes = [0x90u8, 0xcc, 0xcc, 0xcc, 0xcc, 0x90, 0x90];
        let image = ByteImage::from_memory(&bytes);
        let active = image.start() + 3;
        let starts = procedure_starts(&image, active, DEFAULT_PROCEDURE_WINDOW).unwrap();
        assert!(starts.is_empty());
    }

    #[test]
    fn test_window_limits_lookbehind() {
        let mut bytes = vec![0x90u8, 0x55, 0x8b, 0xec];
        bytes.extend(std::iter::repeat(0x90).take(64));
        let image = ByteImage::from_memory(&bytes);
        let active = image.start() + 40;

        assert!(procedure_starts(&image, active, 16).unwrap().is_empty());
        let wide = procedure_starts(&image, active, 64).unwrap();
        assert_eq!(raw(&image, &wide), vec![1]);
    }

    #[test]
    fn test_duplicate_boundaries_collapse() {
        // The prologue directly follows padding, so both rules point at 3.
        let bytes = [0xc3u8, 0xcc, 0xcc, 0x55, 0x8b, 0xec, 0x90, 0x90, 0x90];
        let image = ByteImage::from_memory(&bytes);
        let active = image.start() + 7;
        let starts = procedure_starts(&image, active, DEFAULT_PROCEDURE_WINDOW).unwrap();
        assert_eq!(raw(&image, &starts), vec![3]);
    }
}
