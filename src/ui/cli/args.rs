// Mon Oct 19 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sigscan")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Byte signature scanner for x86 binary images", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[arg(long, global = true)]
    pub json_output: bool,

    /// JSON config file; flags given here win over its values.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Virtual address of the first image byte (hex with 0x, or decimal).
    #[arg(long, global = true, value_parser = parse_number)]
    pub virtual_base: Option<u64>,

    /// Memory-map images instead of reading them.
    #[arg(long, global = true)]
    pub map: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one chain built from flags and print the surviving candidates.
    Find(FindArgs),
    /// Evaluate a signature database against an image.
    Run(RunArgs),
    /// Compile a hex pattern and show how it is read.
    Compile(CompileArgs),
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    #[arg(short, long)]
    pub binary: PathBuf,

    /// Hex pattern, `??` marks a wildcard byte.
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Literal text to search for instead of a pattern.
    #[arg(short, long)]
    pub string: Option<String>,

    #[arg(long)]
    pub backward: bool,

    /// Window size in bytes; 0 scans to the image end.
    #[arg(long, default_value = "0", value_parser = parse_size)]
    pub limit: usize,

    /// Replace the candidates with the starts of their enclosing procedure.
    #[arg(long)]
    pub procedure_start: bool,

    #[arg(long)]
    pub nth: Option<usize>,

    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<i64>,

    /// Resolve the branch at the active candidate.
    #[arg(long)]
    pub relative: bool,

    /// Instruction length used by --relative, needed for far calls.
    #[arg(long, requires = "relative")]
    pub instruction_len: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[arg(short, long)]
    pub binary: PathBuf,

    #[arg(short, long)]
    pub signatures: PathBuf,

    /// Write results here; `.json` gets JSON, anything else plain text.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub sequential: bool,
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    pub pattern: String,

    /// Accept whitespace between byte pairs.
    #[arg(long)]
    pub lenient: bool,
}

impl FindArgs {
    pub fn validate(&self) -> Result<(), String> {
        match (&self.pattern, &self.string) {
            (None, None) => Err("Either --pattern or --string must be specified".to_string()),
            (Some(_), Some(_)) => Err("Cannot specify both --pattern and --string".to_string()),
            _ if self.string.is_some() && (self.backward || self.limit != 0) => {
                Err("--backward and --limit only apply to --pattern".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl RunArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.signatures.exists() {
            return Err(format!("Signature file does not exist: {:?}", self.signatures));
        }
        Ok(())
    }
}

fn parse_number(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid number {:?}: {}", s, e))
}

fn parse_size(s: &str) -> Result<usize, String> {
    let value = parse_number(s)?;
    usize::try_from(value).map_err(|e| format!("{} does not fit: {}", s, e))
}
