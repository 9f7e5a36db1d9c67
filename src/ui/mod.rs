// Mon Oct 19 2026 - Alex

pub mod cli;
pub mod progress;

pub use cli::{Args, Command, CommandHandler};
pub use progress::ProgressBar;
