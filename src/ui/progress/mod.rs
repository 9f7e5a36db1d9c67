// Mon Oct 19 2026 - Alex

pub mod bar;

pub use bar::ProgressBar;
