// Mon Oct 19 2026 - Alex

use crate::pattern::{MatchError, Resolved};
use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignatureOutcome {
    Found(Resolved),
    Failed { error: String },
}

impl SignatureOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl From<Result<Resolved, MatchError>> for SignatureOutcome {
    fn from(result: Result<Resolved, MatchError>) -> Self {
        match result {
            Ok(resolved) => Self::Found(resolved),
            Err(e) => Self::Failed { error: e.to_string() },
        }
    }
}

/// Results of a signature run, in database order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub image: String,
    pub results: IndexMap<String, SignatureOutcome>,
}

impl RunSummary {
    pub fn new(image: &str) -> Self {
        Self {
            image: image.to_string(),
            results: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, outcome: SignatureOutcome) {
        self.results.insert(name.to_string(), outcome);
    }

    pub fn found_count(&self) -> usize {
        self.results.values().filter(|o| o.is_found()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.found_count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = if path.as_ref().extension().is_some_and(|ext| ext == "json") {
            self.to_json()?
        } else {
            self.to_string()
        };
        fs::write(path, content)?;
        Ok(())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.results.keys().map(|k| k.len()).max().unwrap_or(0);
        for (name, outcome) in &self.results {
            match outcome {
                SignatureOutcome::Found(resolved) => writeln!(
                    f,
                    "{:width$}  {}  ({} candidate(s))",
                    name,
                    resolved.value,
                    resolved.candidates,
                    width = width
                )?,
                SignatureOutcome::Failed { error } => {
                    writeln!(f, "{:width$}  {}", name, error, width = width)?
                }
            }
        }
        Ok(())
    }
}

/// Colored console listing.
pub fn print_summary(summary: &RunSummary) {
    println!("{}", "Results".cyan().bold());
    println!("{}", "-".repeat(40).cyan());
    for (name, outcome) in &summary.results {
        match outcome {
            SignatureOutcome::Found(resolved) => println!(
                "  {} {} {}",
                name.cyan(),
                resolved.value.to_string().green(),
                format!("[{}]", resolved.candidates).dimmed()
            ),
            SignatureOutcome::Failed { error } => println!("  {} {}", name.cyan(), error.red()),
        }
    }
    println!();
    println!(
        "{} {} found, {} failed",
        "[+]".green(),
        summary.found_count(),
        summary.failed_count()
    );
}
