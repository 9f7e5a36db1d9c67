// Mon Oct 19 2026 - Alex

use crate::pattern::{Pattern, PatternError};

/// Turns `"8B??45F8"` style text into a `Pattern`. Text is a run of
/// two-character pairs, each either a hex byte or the wildcard `??`.
pub struct PatternCompiler {
    ignore_whitespace: bool,
}

impl PatternCompiler {
    pub fn new() -> Self {
        Self {
            ignore_whitespace: false,
        }
    }

    /// Accept IDA-style `"55 8B EC"` text by dropping whitespace first.
    pub fn ignore_whitespace(mut self, enabled: bool) -> Self {
        self.ignore_whitespace = enabled;
        self
    }

    pub fn compile(&self, source: &str) -> Result<Pattern, PatternError> {
        let text: Vec<u8> = if self.ignore_whitespace {
            source.bytes().filter(|b| !b.is_ascii_whitespace()).collect()
        } else {
            source.bytes().collect()
        };

        if text.len() % 2 != 0 {
            return Err(PatternError::malformed(
                source,
                format!("odd number of characters ({})", text.len()),
            ));
        }

        let mut bytes = Vec::with_capacity(text.len() / 2);
        let mut wildcards = Vec::with_capacity(text.len() / 2);

        for (index, pair) in text.chunks_exact(2).enumerate() {
            match (pair[0], pair[1]) {
                (b'?', b'?') => {
                    bytes.push(0);
                    wildcards.push(true);
                }
                (hi, lo) => {
                    let byte = match (hex_value(hi), hex_value(lo)) {
                        (Some(hi), Some(lo)) => (hi << 4) | lo,
                        _ => {
                            return Err(PatternError::malformed(
                                source,
                                format!(
                                    "invalid pair '{}{}' at byte {}",
                                    hi as char, lo as char, index
                                ),
                            ))
                        }
                    };
                    bytes.push(byte);
                    wildcards.push(false);
                }
            }
        }

        Pattern::new(bytes, wildcards)
    }
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

/// Strict compile of signature text.
pub fn compile(source: &str) -> Result<Pattern, PatternError> {
    PatternCompiler::new().compile(source)
}

/// Lowercase hex, no separators. Wildcard positions carry no marker here.
pub fn format_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        out.push(DIGITS[(byte >> 4) as usize] as char);
        out.push(DIGITS[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_plain_bytes() {
        let pattern = compile("558BEC").unwrap();
        assert_eq!(pattern.bytes(), &[0x55, 0x8b, 0xec]);
        assert!(pattern.wildcards().iter().all(|&w| !w));
    }

    #[test]
    fn test_compile_wildcards_and_case() {
        let pattern = compile("8b??45F8").unwrap();
        assert_eq!(pattern.bytes(), &[0x8b, 0x00, 0x45, 0xf8]);
        assert_eq!(pattern.wildcards(), &[false, true, false, false]);
    }

    #[test]
    fn test_compile_empty_text_gives_empty_pattern() {
        let pattern = compile("").unwrap();
        assert!(pattern.is_empty());
    }

    #[test]
    fn test_odd_length_is_malformed() {
        assert!(matches!(compile("5"), Err(PatternError::Malformed { .. })));
        assert!(matches!(compile("558"), Err(PatternError::Malformed { .. })));
    }

    #[test]
    fn test_bad_characters_are_malformed() {
        assert!(matches!(compile("5G"), Err(PatternError::Malformed { .. })));
        assert!(matches!(compile("?5"), Err(PatternError::Malformed { .. })));
        assert!(matches!(compile("5?"), Err(PatternError::Malformed { .. })));
        assert!(matches!(compile("55 8B"), Err(PatternError::Malformed { .. })));
    }

    #[test]
    fn test_whitespace_tolerant_compiler() {
        let compiler = PatternCompiler::new().ignore_whitespace(true);
        let pattern = compiler.compile("55 8B EC ?? ??").unwrap();
        assert_eq!(pattern.len(), 5);
        assert_eq!(pattern.wildcard_byte_count(), 2);
    }

    #[test]
    fn test_format_hex_renders_wildcards_as_zero() {
        let text = "8B??45F8";
        let pattern = compile(text).unwrap();
        assert_eq!(format_hex(pattern.bytes()), "8b0045f8");
        assert_eq!(format_hex(&[]), "");
        assert_eq!(format_hex(&[0x0a, 0xff]), "0aff");
    }
}
