//! Command-line interface definitions.
//!
//! All CLI arguments are defined with the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under the current directory
//! dupvault
//!
//! # Scan a specific tree, excluding build output
//! dupvault ~/photos --exclude target --exclude .cache
//!
//! # Move duplicates into a quarantine folder
//! dupvault ~/photos --relocate
//!
//! # See what would move, without touching anything
//! dupvault ~/photos --relocate --dry-run
//!
//! # Machine-readable output for scripting
//! dupvault ~/photos --output json
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Duplicate file finder with safe quarantine-based relocation.
///
/// dupvault finds duplicate files by SHA-256 content digest (with a
/// size-based prefilter so unique files are never read) and can move the
/// extra copies into a timestamped quarantine folder for review. Nothing
/// is ever deleted.
#[derive(Debug, Parser)]
#[command(name = "dupvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Directory names to exclude (can be specified multiple times)
    ///
    /// These are skipped wherever they appear in the tree, in addition to
    /// the built-in exclusions and prior quarantine folders.
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Number of worker threads for hashing (default: all cores)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Move duplicates into the quarantine folder (default: report only)
    #[arg(long)]
    pub relocate: bool,

    /// With --relocate, show planned moves without touching any file
    #[arg(long, requires = "relocate")]
    pub dry_run: bool,

    /// Quarantine directory (default: <PATH>/Duplicates_<timestamp>)
    #[arg(long, value_name = "DIR")]
    pub quarantine: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
