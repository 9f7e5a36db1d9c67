// Mon Oct 19 2026 - Alex

use crate::memory::Address;
use crate::pattern::Matcher;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchEntry {
    pub address: Address,
    pub raw_offset: u64,
    pub offset: u64,
}

/// Snapshot of every candidate a matcher currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub matched: usize,
    pub entries: Vec<MatchEntry>,
}

impl MatchReport {
    pub fn from_matcher(matcher: &Matcher<'_>) -> Self {
        let image = matcher.image();
        let start = image.start().as_u64();
        let entries: Vec<MatchEntry> = matcher
            .candidates()
            .iter()
            .map(|&address| {
                let raw_offset = address.as_u64().wrapping_sub(start);
                MatchEntry {
                    address,
                    raw_offset,
                    offset: raw_offset.wrapping_add(image.virtual_base()),
                }
            })
            .collect();

        Self {
            matched: entries.len(),
            entries,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matched:{}", self.matched)?;
        for entry in &self.entries {
            writeln!(f, "- ptr:{} offset:{:x}", entry.address, entry.offset)?;
        }
        Ok(())
    }
}
