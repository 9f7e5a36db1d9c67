// Mon Oct 19 2026 - Alex

pub mod args;
pub mod handler;

pub use args::{Args, Command, CompileArgs, FindArgs, RunArgs};
pub use handler::CommandHandler;

use clap::Parser;

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn run() -> anyhow::Result<()> {
    let args = parse_args();
    CommandHandler::new().execute(args)
}
