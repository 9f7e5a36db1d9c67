// Mon Oct 19 2026 - Alex

use crate::pattern::PatternError;
use std::fmt;

/// Byte pattern with a parallel wildcard mask. `wildcards[i] == true` means
/// position `i` matches any byte; the stored byte there is `0x00`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    bytes: Vec<u8>,
    wildcards: Vec<bool>,
}

impl Pattern {
    pub fn new(bytes: Vec<u8>, wildcards: Vec<bool>) -> Result<Self, PatternError> {
        if bytes.len() != wildcards.len() {
            return Err(PatternError::Malformed {
                pattern: crate::pattern::format_hex(&bytes),
                reason: format!("{} byte(s) but {} mask entries", bytes.len(), wildcards.len()),
            });
        }
        let bytes = bytes
            .into_iter()
            .zip(wildcards.iter())
            .map(|(b, &wild)| if wild { 0 } else { b })
            .collect();
        Ok(Self { bytes, wildcards })
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            wildcards: vec![false; bytes.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn wildcards(&self) -> &[bool] {
        &self.wildcards
    }

    pub fn is_wildcard(&self, index: usize) -> bool {
        self.wildcards.get(index).copied().unwrap_or(false)
    }

    #[inline]
    pub fn matches_byte(&self, index: usize, byte: u8) -> bool {
        self.wildcards[index] || self.bytes[index] == byte
    }

    pub fn significant_byte_count(&self) -> usize {
        self.wildcards.iter().filter(|&&w| !w).count()
    }

    pub fn wildcard_byte_count(&self) -> usize {
        self.wildcards.iter().filter(|&&w| w).count()
    }

    /// Compact text form accepted back by the compiler, wildcards as `??`.
    pub fn to_hex_string(&self) -> String {
        self.bytes
            .iter()
            .zip(self.wildcards.iter())
            .map(|(b, &wild)| {
                if wild {
                    "??".to_string()
                } else {
                    format!("{:02x}", b)
                }
            })
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zeroes_wildcard_bytes() {
        let pattern = Pattern::new(vec![0x8b, 0x45], vec![false, true]).unwrap();
        assert_eq!(pattern.bytes(), &[0x8b, 0x00]);
        assert!(pattern.is_wildcard(1));
        assert!(!pattern.is_wildcard(5));
    }

    #[test]
    fn test_new_rejects_mask_length_mismatch() {
        let result = Pattern::new(vec![0x90], vec![false, false]);
        assert!(matches!(result, Err(PatternError::Malformed { .. })));
    }

    #[test]
    fn test_counts_and_hex() {
        let pattern = Pattern::new(vec![0x8b, 0, 0x45, 0xf8], vec![false, true, false, false]).unwrap();
        assert_eq!(pattern.significant_byte_count(), 3);
        assert_eq!(pattern.wildcard_byte_count(), 1);
        assert_eq!(pattern.to_hex_string(), "8b??45f8");
        assert!(pattern.matches_byte(1, 0x77));
        assert!(!pattern.matches_byte(0, 0x77));
    }
}
