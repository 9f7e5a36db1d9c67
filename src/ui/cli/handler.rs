// Mon Oct 19 2026 - Alex

use super::args::{Args, Command, CompileArgs, FindArgs, RunArgs};
use crate::config::Config;
use crate::memory::ByteImage;
use crate::output::{print_summary, MatchReport, RunSummary, SignatureOutcome};
use crate::pattern::{MatchError, Matcher, PatternCompiler, SignatureDatabase};
use crate::ui::progress::ProgressBar;
use crate::utils::{format_bytes, format_duration, init_logger, level_from_str, ScopedTimer};
use anyhow::Context;
use colored::Colorize;
use rayon::prelude::*;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct CommandHandler {
    quiet: bool,
    json_output: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        self.quiet = args.quiet;
        self.json_output = args.json_output;

        init_logger(level_from_str(&args.log_level));
        if args.no_color {
            colored::control::set_override(false);
        }

        let config = self.load_config(&args)?;

        match args.command {
            Command::Find(find_args) => self.handle_find(&config, find_args),
            Command::Run(run_args) => self.handle_run(&config, run_args),
            Command::Compile(compile_args) => self.handle_compile(compile_args),
        }
    }

    fn load_config(&self, args: &Args) -> anyhow::Result<Config> {
        let mut config = match &args.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(base) = args.virtual_base {
            config = config.with_virtual_base(base);
        }
        if args.map {
            config = config.with_map_files(true);
        }
        Ok(config)
    }

    fn open_image(&self, config: &Config, path: &std::path::Path) -> anyhow::Result<ByteImage<'static>> {
        let image = config
            .open_image(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?;
        self.status(&format!(
            "Loaded {} ({}, base {:#x})",
            path.display(),
            format_bytes(image.len() as u64),
            image.virtual_base()
        ));
        Ok(image)
    }

    fn handle_find(&self, config: &Config, args: FindArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let image = self.open_image(config, &args.binary)?;
        let _timer = ScopedTimer::new("find");
        let mut matcher = config.matcher(&image);

        run_find_chain(&mut matcher, &args)?;

        let report = MatchReport::from_matcher(&matcher);
        if self.json_output {
            println!("{}", report.to_json()?);
        } else {
            print!("{}", report);
        }

        if args.relative {
            let target = match args.instruction_len {
                Some(len) => matcher.relative_target_with_len(len)?,
                None => matcher.relative_target()?,
            };
            println!("{} target: {:#x}", "[+]".green(), target);
        }
        Ok(())
    }

    fn handle_run(&self, config: &Config, args: RunArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let started = Instant::now();
        let database = SignatureDatabase::load(&args.signatures)
            .with_context(|| format!("Failed to load signatures {}", args.signatures.display()))?;
        let image = self.open_image(config, &args.binary)?;

        let total = database.len() as u64;
        let progress = if self.quiet || self.json_output {
            ProgressBar::hidden(total)
        } else {
            ProgressBar::new(total).with_message("Evaluating signatures")
        };

        let evaluate = |signature: &crate::pattern::Signature| {
            let outcome = SignatureOutcome::from(signature.evaluate(config.matcher(&image)));
            progress.increment(1);
            (signature.name.clone(), outcome)
        };

        let outcomes: Vec<(String, SignatureOutcome)> = if config.parallel && !args.sequential {
            database.signatures.par_iter().map(evaluate).collect()
        } else {
            database.signatures.iter().map(evaluate).collect()
        };
        progress.finish_with_message("Complete!");

        let mut summary = RunSummary::new(&args.binary.display().to_string());
        for (name, outcome) in outcomes {
            summary.insert(&name, outcome);
        }

        if self.json_output {
            println!("{}", summary.to_json()?);
        } else if !self.quiet {
            print_summary(&summary);
            println!(
                "{} Finished in {}",
                "[+]".green(),
                format_duration(started.elapsed())
            );
        }

        if let Some(path) = &args.output {
            summary.save(path)?;
            self.status(&format!("Results saved to: {}", path.display()));
        }
        Ok(())
    }

    fn handle_compile(&self, args: CompileArgs) -> anyhow::Result<()> {
        let pattern = PatternCompiler::new()
            .ignore_whitespace(args.lenient)
            .compile(&args.pattern)?;

        let mask: String = pattern
            .wildcards()
            .iter()
            .map(|&wild| if wild { '?' } else { 'x' })
            .collect();

        if self.json_output {
            let doc = serde_json::json!({
                "pattern": pattern.to_hex_string(),
                "mask": mask,
                "length": pattern.len(),
                "significant": pattern.significant_byte_count(),
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        } else {
            println!("{}  {}", "pattern".cyan(), pattern);
            println!("{}     {}", "mask".cyan(), mask);
            println!(
                "{}   {} byte(s), {} wildcard(s)",
                "length".cyan(),
                pattern.len(),
                pattern.wildcard_byte_count()
            );
        }
        Ok(())
    }

    fn status(&self, message: &str) {
        if !self.quiet && !self.json_output {
            println!("{} {}", "[*]".blue(), message);
        }
    }
}

/// Applies the `find` flags in a fixed order: search, procedure start,
/// nth, offset.
fn run_find_chain(matcher: &mut Matcher<'_>, args: &FindArgs) -> Result<(), MatchError> {
    if let Some(pattern) = &args.pattern {
        matcher.search_hex(pattern, args.backward, args.limit)?;
    } else if let Some(text) = &args.string {
        matcher.search_string(text)?;
    }
    if args.procedure_start {
        matcher.search_procedure_start(0)?;
    }
    if let Some(index) = args.nth {
        matcher.nth(index)?;
    }
    if let Some(delta) = args.offset {
        matcher.offsetted(delta)?;
    }
    Ok(())
}
