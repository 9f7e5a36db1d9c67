// Mon Oct 19 2026 - Alex

pub mod branch;
pub mod procedure;

pub use branch::{resolve, BranchKind};
pub use procedure::{procedure_starts, DEFAULT_PROCEDURE_WINDOW};
