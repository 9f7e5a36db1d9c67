// Mon Oct 19 2026 - Alex

use crate::analysis::{self, DEFAULT_PROCEDURE_WINDOW};
use crate::memory::{Address, ByteImage, MemoryError, MemoryReader, Scalar, Segment};
use crate::pattern::{search, Direction, MatchError, Pattern, PatternCompiler, PatternError};

/// Chainable query over one image.
///
/// Holds the current candidate addresses; the first one is the active
/// address every chained step is anchored at. Steps replace the candidate
/// list and return the matcher again, so a chain reads as
///
/// ```no_run
/// # use sigscan::memory::ByteImage;
/// # fn demo(image: &ByteImage) -> Result<u64, sigscan::pattern::MatchError> {
/// image
///     .matcher()
///     .search_hex("558BEC", false, 0)?
///     .offsetted(5)?
///     .relative_target()
/// # }
/// ```
///
/// A step that matches nothing leaves the matcher empty; steps that need
/// the active address then fail with `NoActiveCandidate`. A step that
/// fails leaves the candidates untouched.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    image: &'a ByteImage<'a>,
    candidates: Vec<Address>,
    procedure_window: usize,
    lenient_patterns: bool,
}

impl<'a> Matcher<'a> {
    pub(crate) fn new(image: &'a ByteImage<'a>) -> Self {
        Self::with_start(image, image.start())
    }

    pub(crate) fn with_start(image: &'a ByteImage<'a>, start: Address) -> Self {
        Self {
            image,
            candidates: vec![start],
            procedure_window: DEFAULT_PROCEDURE_WINDOW,
            lenient_patterns: false,
        }
    }

    /// Look-behind used by `search_procedure_start(0)`.
    pub fn with_procedure_window(mut self, window: usize) -> Self {
        self.procedure_window = window;
        self
    }

    /// Let `search_hex` accept whitespace between byte pairs.
    pub fn with_lenient_patterns(mut self, lenient: bool) -> Self {
        self.lenient_patterns = lenient;
        self
    }

    pub fn image(&self) -> &'a ByteImage<'a> {
        self.image
    }

    pub fn candidates(&self) -> &[Address] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn active(&self) -> Result<Address, MatchError> {
        self.candidates
            .first()
            .copied()
            .ok_or(MatchError::NoActiveCandidate)
    }

    /// Virtual address of the active candidate.
    pub fn offset(&self) -> Result<u64, MatchError> {
        Ok(self.raw_offset()? + self.image.virtual_base())
    }

    /// Buffer-relative offset of the active candidate.
    pub fn raw_offset(&self) -> Result<u64, MatchError> {
        let active = self.active()?;
        Ok(self.image.offset_of(active)? as u64)
    }

    pub fn reset(&mut self) -> &mut Self {
        self.candidates = vec![self.image.start()];
        self
    }

    pub fn read<T: Scalar>(&self, byte_offset: i64) -> Result<T, MatchError> {
        let active = self.active()?;
        let addr = active
            .checked_offset(byte_offset)
            .ok_or(MemoryError::AddressOverflow(active))?;
        Ok(self.image.read::<T>(addr)?)
    }

    /// Searches compiled hex text from the active address. A non-zero
    /// `limit` bounds the window to `[active, active + limit)` forward or
    /// `(active - limit, active]` backward. Zero spans from the active
    /// address to the image end in either direction; a backward scan walks
    /// that span from the end down.
    pub fn search_hex(&mut self, text: &str, backward: bool, limit: usize) -> Result<&mut Self, MatchError> {
        let pattern = PatternCompiler::new()
            .ignore_whitespace(self.lenient_patterns)
            .compile(text)?;
        let direction = if backward {
            Direction::Backward
        } else {
            Direction::Forward
        };
        self.search_pattern(&pattern, direction, limit)
    }

    pub fn search_pattern(
        &mut self,
        pattern: &Pattern,
        direction: Direction,
        limit: usize,
    ) -> Result<&mut Self, MatchError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty.into());
        }
        let active = self.active()?;
        let segment = match (direction, limit) {
            (Direction::Forward, 0) => Segment::starting_at(active),
            (Direction::Forward, limit) => Segment::new(Some(active), active.checked_add(limit as u64)),
            (Direction::Backward, 0) => Segment::starting_at(active),
            (Direction::Backward, limit) => Segment::new(active.checked_sub(limit as u64), Some(active)),
        };
        let found = search(self.image, pattern, segment, direction)?;
        log::debug!("{} search for {} from {} -> {} match(es)", direction, pattern, active, found.len());
        self.candidates = found;
        Ok(self)
    }

    /// Searches the literal bytes of `text` forward from the active address.
    pub fn search_string(&mut self, text: &str) -> Result<&mut Self, MatchError> {
        let pattern = Pattern::from_bytes(text.as_bytes());
        self.search_pattern(&pattern, Direction::Forward, 0)
    }

    /// Moves every candidate by `delta` bytes. Each moved address must stay
    /// inside the image.
    pub fn offsetted(&mut self, delta: i64) -> Result<&mut Self, MatchError> {
        let moved = self
            .candidates
            .iter()
            .map(|&addr| {
                let target = addr
                    .checked_offset(delta)
                    .ok_or(MemoryError::AddressOverflow(addr))?;
                self.image.check_span(target, 1)?;
                Ok(target)
            })
            .collect::<Result<Vec<_>, MemoryError>>()?;
        self.candidates = moved;
        Ok(self)
    }

    pub fn nth(&mut self, n: usize) -> Result<&mut Self, MatchError> {
        let picked = *self.candidates.get(n).ok_or(MatchError::IndexOutOfRange {
            index: n,
            len: self.candidates.len(),
        })?;
        self.candidates = vec![picked];
        Ok(self)
    }

    /// Replaces the candidates with probable starts of the enclosing
    /// procedure, closest first. `limit == 0` uses the configured window.
    pub fn search_procedure_start(&mut self, limit: usize) -> Result<&mut Self, MatchError> {
        let active = self.active()?;
        let window = if limit == 0 { self.procedure_window } else { limit };
        self.candidates = analysis::procedure_starts(self.image, active, window)?;
        Ok(self)
    }

    /// Target of the `E8`/`E9` branch at the active address.
    pub fn relative_target(&self) -> Result<u64, MatchError> {
        self.resolve_branch(None)
    }

    /// Like `relative_target`, with the instruction length given by the
    /// caller. Needed for `9A` far calls.
    pub fn relative_target_with_len(&self, instruction_len: usize) -> Result<u64, MatchError> {
        self.resolve_branch(Some(instruction_len))
    }

    fn resolve_branch(&self, instruction_len: Option<usize>) -> Result<u64, MatchError> {
        let active = self.active()?;
        analysis::resolve(self.image, active, self.offset()?, instruction_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 13] = [
        0x55, 0x8b, 0xec, 0x90, 0x90, 0xe8, 0x10, 0x00, 0x00, 0x00, 0xcc, 0xcc, 0x90,
    ];

    #[test]
    fn test_prologue_then_call_target() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher();

        matcher.search_hex("558BEC", false, 0).unwrap();
        assert_eq!(matcher.raw_offset().unwrap(), 0);

        matcher.offsetted(5).unwrap();
        assert_eq!(matcher.raw_offset().unwrap(), 5);
        assert_eq!(matcher.read::<u8>(0).unwrap(), 0xe8);
        assert_eq!(matcher.offset().unwrap(), 0x400005);
        assert_eq!(matcher.relative_target().unwrap(), 0x40001a);
    }

    #[test]
    fn test_fluent_chain() {
        let image = ByteImage::from_memory(&SAMPLE);
        let target = image
            .matcher()
            .search_hex("558BEC", false, 0)
            .and_then(|m| m.offsetted(5))
            .and_then(|m| m.relative_target())
            .unwrap();
        assert_eq!(target, 0x40001a);
    }

    #[test]
    fn test_wildcard_hex_search() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher();
        matcher.search_hex("8B??", false, 0).unwrap();
        assert_eq!(matcher.len(), 1);
        assert_eq!(matcher.raw_offset().unwrap(), 1);
    }

    #[test]
    fn test_pattern_errors_leave_candidates_alone() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher();

        let err = matcher.search_hex("", false, 0).unwrap_err();
        assert!(matches!(err, MatchError::Pattern(PatternError::Empty)));

        let err = matcher.search_hex("5", false, 0).unwrap_err();
        assert!(matches!(err, MatchError::Pattern(PatternError::Malformed { .. })));

        assert_eq!(matcher.candidates(), &[image.start()]);
    }

    #[test]
    fn test_nth_out_of_range() {
        let bytes = [0x90u8, 0x90, 0x11, 0x90, 0x11, 0x00];
        let image = ByteImage::from_memory(&bytes);
        let mut matcher = image.matcher();
        matcher.search_hex("90", false, 0).unwrap();
        assert_eq!(matcher.len(), 3);
        matcher.search_hex("9011", false, 0).unwrap();
        assert_eq!(matcher.len(), 2);

        let err = matcher.nth(5).unwrap_err();
        assert!(matches!(err, MatchError::IndexOutOfRange { index: 5, len: 2 }));

        matcher.nth(1).unwrap();
        assert_eq!(matcher.raw_offset().unwrap(), 3);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher();
        matcher.search_hex("CC", false, 0).unwrap();
        matcher.reset();
        assert_eq!(matcher.candidates(), &[image.start()]);

        matcher.search_hex("DEAD", false, 0).unwrap();
        assert!(matcher.is_empty());
        matcher.reset().reset();
        assert_eq!(matcher.candidates(), &[image.start()]);
    }

    #[test]
    fn test_empty_session_requires_reset() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher();
        matcher.search_hex("DEADBEEF", false, 0).unwrap();
        assert!(matcher.is_empty());

        assert!(matcher.active().unwrap_err().is_no_active_candidate());
        assert!(matcher.offset().unwrap_err().is_no_active_candidate());
        assert!(matcher.read::<u32>(0).unwrap_err().is_no_active_candidate());
        assert!(matcher.search_hex("90", false, 0).unwrap_err().is_no_active_candidate());
        assert!(matcher.search_procedure_start(0).unwrap_err().is_no_active_candidate());
        assert!(matcher.relative_target().unwrap_err().is_no_active_candidate());

        matcher.offsetted(4).unwrap();
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_limit_bounds_forward_window() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher();
        matcher.search_hex("90", false, 4).unwrap();
        assert_eq!(matcher.raw_offset().unwrap(), 3);
        assert_eq!(matcher.len(), 1);
    }

    fn raw(image: &ByteImage, matcher: &Matcher<'_>) -> Vec<u64> {
        matcher
            .candidates()
            .iter()
            .map(|a| a.as_u64() - image.start().as_u64())
            .collect()
    }

    #[test]
    fn test_unbounded_backward_search_runs_to_image_end() {
        let bytes = [0x55u8, 0x8b, 0xec, 0x90, 0x55, 0x8b, 0xec, 0x90, 0x90, 0x90];
        let image = ByteImage::from_memory(&bytes);

        // The active address itself is the range start and is not tried.
        let mut matcher = image.matcher();
        matcher.search_hex("558BEC", true, 0).unwrap();
        assert_eq!(raw(&image, &matcher), vec![4]);

        let mut nops = image.matcher();
        nops.search_hex("90", true, 0).unwrap();
        assert_eq!(raw(&image, &nops), vec![9, 8, 7, 3]);
    }

    #[test]
    fn test_backward_search_from_active() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher_at(image.start() + 4).unwrap();

        matcher.search_hex("90", true, 0).unwrap();
        assert_eq!(raw(&image, &matcher), vec![12]);

        let mut bounded = image.matcher_at(image.start() + 11).unwrap();
        bounded.search_hex("CC", true, 7).unwrap();
        assert_eq!(raw(&image, &bounded), vec![11, 10]);

        let mut bounded = image.matcher_at(image.start() + 11).unwrap();
        bounded.search_hex("90", true, 7).unwrap();
        assert!(bounded.is_empty());
    }

    #[test]
    fn test_search_string() {
        let bytes = b"\x00\x01player_health\x00score\x00";
        let image = ByteImage::from_memory(bytes);
        let mut matcher = image.matcher();
        matcher.search_string("score").unwrap();
        assert_eq!(matcher.raw_offset().unwrap(), 16);

        let err = matcher.reset().search_string("").unwrap_err();
        assert!(matches!(err, MatchError::Pattern(PatternError::Empty)));
    }

    #[test]
    fn test_offsetted_moves_all_candidates_and_checks_bounds() {
        let bytes = [0x90u8, 0x11, 0x90, 0x11, 0x00, 0x00];
        let image = ByteImage::from_memory(&bytes);
        let mut matcher = image.matcher();
        matcher.search_hex("90", false, 0).unwrap();
        matcher.offsetted(1).unwrap();
        let raw: Vec<u64> = matcher
            .candidates()
            .iter()
            .map(|a| a.as_u64() - image.start().as_u64())
            .collect();
        assert_eq!(raw, vec![1, 3]);

        let err = matcher.offsetted(-2).unwrap_err();
        assert!(matches!(err, MatchError::Memory(ref e) if e.is_out_of_bounds()));
        assert_eq!(matcher.len(), 2);

        let err = matcher.offsetted(100).unwrap_err();
        assert!(matches!(err, MatchError::Memory(ref e) if e.is_out_of_bounds()));
    }

    #[test]
    fn test_read_is_bounds_checked() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut matcher = image.matcher();
        matcher.search_hex("E8", false, 0).unwrap();
        assert_eq!(matcher.read::<i32>(1).unwrap(), 0x10);
        assert_eq!(matcher.read::<u16>(-5).unwrap(), 0x8b55);
        assert!(matcher.read::<u64>(5).is_err());
        assert!(matcher.read::<u8>(-6).is_err());
    }

    #[test]
    fn test_procedure_start_then_nth() {
        let bytes = [
            0xc3u8, 0xcc, 0xcc, 0x55, 0x8b, 0xec, 0x83, 0xec, 0x08, 0xe8, 0x00, 0x00, 0x00, 0x00,
            0xc3, 0xcc, 0xcc, 0x56, 0x90, 0x90,
        ];
        let image = ByteImage::from_memory(&bytes);
        let mut matcher = image.matcher();
        matcher.search_hex("E8", false, 0).unwrap();
        matcher.search_procedure_start(0).unwrap().nth(0).unwrap();
        assert_eq!(matcher.raw_offset().unwrap(), 3);
    }

    #[test]
    fn test_explicit_procedure_window_respected() {
        let mut bytes = vec![0x90u8, 0x55, 0x8b, 0xec];
        bytes.extend(std::iter::repeat(0x90).take(40));
        let image = ByteImage::from_memory(&bytes);

        let mut narrow = image.matcher_at(image.start() + 30).unwrap().with_procedure_window(8);
        narrow.search_procedure_start(0).unwrap();
        assert!(narrow.is_empty());

        let mut wide = image.matcher_at(image.start() + 30).unwrap();
        wide.search_procedure_start(0).unwrap();
        assert_eq!(wide.raw_offset().unwrap(), 1);
    }

    #[test]
    fn test_lenient_patterns() {
        let image = ByteImage::from_memory(&SAMPLE);
        let mut strict = image.matcher();
        assert!(strict.search_hex("55 8B EC", false, 0).is_err());

        let mut lenient = image.matcher().with_lenient_patterns(true);
        lenient.search_hex("55 8B EC", false, 0).unwrap();
        assert_eq!(lenient.raw_offset().unwrap(), 0);
    }

    #[test]
    fn test_virtual_base_is_an_image_property() {
        let image = ByteImage::from_memory(&SAMPLE).with_virtual_base(0x10000000);
        let mut matcher = image.matcher();
        matcher.search_hex("E8", false, 0).unwrap();
        assert_eq!(matcher.offset().unwrap(), 0x10000005);
        assert_eq!(matcher.relative_target().unwrap(), 0x1000001a);
    }
}
