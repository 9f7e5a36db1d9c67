// Mon Oct 19 2026 - Alex

pub mod analysis;
pub mod config;
pub mod memory;
pub mod output;
pub mod pattern;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use memory::{Address, ByteImage, MemoryError, Segment};
pub use output::MatchReport;
pub use pattern::{Direction, MatchError, Matcher, Pattern, PatternCompiler, PatternError, SignatureDatabase};
