// Mon Oct 19 2026 - Alex

pub mod report;
pub mod summary;

pub use report::{MatchEntry, MatchReport};
pub use summary::{print_summary, RunSummary, SignatureOutcome};
