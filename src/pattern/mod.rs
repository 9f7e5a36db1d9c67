// Mon Oct 19 2026 - Alex

pub mod compiler;
pub mod database;
pub mod error;
pub mod matcher;
pub mod pattern;
pub mod scanner;

pub use compiler::{compile, format_hex, PatternCompiler};
pub use database::{
    DatabaseError, Resolution, Resolved, ScalarType, Signature, SignatureDatabase, Step, Value,
};
pub use error::{MatchError, PatternError};
pub use matcher::Matcher;
pub use pattern::Pattern;
pub use scanner::{search, Direction};
