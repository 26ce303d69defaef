//! dupvault - Duplicate file finder with safe quarantine-based relocation.
//!
//! Finds duplicate files by SHA-256 content digest, with a size-based
//! prefilter so files whose size is unique in the tree are never read.
//! Duplicates can be moved into a timestamped quarantine directory that
//! mirrors their original relative paths; the canonical copy of each set
//! (the lexicographically smallest path) stays in place and nothing is
//! ever deleted.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::sync::Arc;

use anyhow::Context;

use crate::actions::{quarantine_dir_name, RelocateConfig, RelocateOutcome, Relocator};
use crate::cli::{Cli, OutputFormat};
use crate::config::AppConfig;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{json::JsonOutput, TextReport};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns an error for fatal conditions only: invalid configuration, a
/// missing root, or interruption. Per-file errors are reported in the
/// output and mapped to [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let quarantine_root = cli
        .quarantine
        .clone()
        .unwrap_or_else(|| cli.path.join(quarantine_dir_name(chrono::Local::now())));

    let mut config = AppConfig::new(cli.path.clone(), quarantine_root)
        .with_excluded_names(cli.exclude.iter().cloned())
        .with_relocate(cli.relocate)
        .with_dry_run(cli.dry_run);
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }
    config.validate()?;

    let shutdown = signal::install_handler().context("failed to install signal handler")?;

    let walker_config = WalkerConfig {
        excluded_names: config.exclude.clone(),
    };
    let mut finder_config = FinderConfig::default()
        .with_workers(config.workers)
        .with_walker_config(walker_config)
        .with_shutdown_flag(shutdown.get_flag());

    // Progress bars only make sense on a terminal report.
    if cli.output == OutputFormat::Text && !cli.quiet {
        finder_config =
            finder_config.with_progress_callback(Arc::new(Progress::new(cli.quiet)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (sets, summary) = finder.find_duplicates(&config.root)?;

    let relocation: Option<RelocateOutcome> = if config.relocate && !sets.is_empty() {
        let relocate_config =
            RelocateConfig::new(config.root.clone(), config.quarantine_root.clone())
                .with_dry_run(config.dry_run)
                .with_shutdown_flag(shutdown.get_flag());
        Some(Relocator::new(relocate_config).relocate_sets(&sets))
    } else {
        None
    };

    let relocation_failed = relocation
        .as_ref()
        .is_some_and(|outcome| !outcome.all_succeeded());
    let exit_code = if summary.has_errors() || relocation_failed {
        ExitCode::PartialSuccess
    } else if sets.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    match cli.output {
        OutputFormat::Text => {
            let mut report = TextReport::new(&sets, &summary);
            if let Some(ref outcome) = relocation {
                report = report.with_relocation(outcome);
            }
            report
                .write_to(&mut std::io::stdout())
                .context("failed to write report")?;
        }
        OutputFormat::Json => {
            let mut json = JsonOutput::new(&sets, &summary, exit_code);
            if let Some(ref outcome) = relocation {
                json = json.with_relocation(outcome);
            }
            println!("{}", json.to_json_pretty().context("failed to serialize report")?);
        }
    }

    Ok(exit_code)
}
