//! Safe relocation of duplicate files into a quarantine directory.
//!
//! # Overview
//!
//! This module moves the non-canonical members of each duplicate set into a
//! run-specific quarantine directory, mirroring their path relative to the
//! scan root so relocated files never collide. The canonical member of a
//! set is never touched, and nothing is ever deleted outright: every action
//! is reversible by moving the file back.
//!
//! # Safety
//!
//! A move is atomic from the caller's perspective. Within one volume this
//! is a plain rename. Across volumes the file is copied, the destination is
//! verified against the source's size and content digest, and only then is
//! the original removed; on verification failure the partial destination is
//! removed and the source left untouched.
//!
//! # Example
//!
//! ```no_run
//! use dupvault::actions::relocate::{RelocateConfig, Relocator};
//! use std::path::PathBuf;
//!
//! let config = RelocateConfig::new(
//!     PathBuf::from("/data/photos"),
//!     PathBuf::from("/data/photos/Duplicates_20260807_120000"),
//! );
//! let relocator = Relocator::new(config);
//! let outcome = relocator.relocate_sets(&[]);
//! println!("{}", outcome.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use crate::duplicates::DuplicateSet;
use crate::scanner::{Digest, FileEntry, Hasher};

/// Error type for relocation operations.
///
/// Per-file: a failed relocation leaves that file at its original location
/// and does not abort the rest of the batch.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// Source file was not found (may have been moved since the scan).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when moving the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Source path is not under the scan root, so no relative destination
    /// can be derived for it.
    #[error("path {path} is outside the scan root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// Destination already exists; it is never overwritten.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// Cross-volume copy did not match the source; the partial destination
    /// was removed and the source left in place.
    #[error("verification failed copying {src} to {dest}")]
    VerificationFailed { src: PathBuf, dest: PathBuf },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocateError {
    fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Record of one completed (or planned, in dry-run mode) relocation.
#[derive(Debug, Clone)]
pub struct RelocationRecord {
    /// Original location of the file.
    pub source: PathBuf,
    /// Location inside the quarantine directory.
    pub dest: PathBuf,
    /// Size of the file in bytes.
    pub size: u64,
}

/// Configuration for a relocation run.
#[derive(Debug, Clone)]
pub struct RelocateConfig {
    /// Root that was scanned; destinations mirror paths relative to it.
    pub scan_root: PathBuf,
    /// Quarantine directory for this run.
    pub quarantine_root: PathBuf,
    /// Report planned moves without touching the filesystem.
    pub dry_run: bool,
    /// Optional shutdown flag; stops dispatching new moves promptly while
    /// letting in-flight moves finish.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl RelocateConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(scan_root: PathBuf, quarantine_root: PathBuf) -> Self {
        Self {
            scan_root,
            quarantine_root,
            dry_run: false,
            shutdown_flag: None,
        }
    }

    /// Enable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Results of a relocation batch.
#[derive(Debug, Default)]
pub struct RelocateOutcome {
    /// Successful (or planned) relocations.
    pub relocated: Vec<RelocationRecord>,
    /// Failed relocations with their reasons; these files remain in place.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes moved into quarantine.
    pub bytes_moved: u64,
    /// Whether this was a dry run (no files were touched).
    pub dry_run: bool,
    /// Whether the batch was cut short by a shutdown request.
    pub interrupted: bool,
}

impl RelocateOutcome {
    /// Number of successful relocations.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.relocated.len()
    }

    /// Number of failed relocations.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every attempted relocation succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the batch.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "Would move" } else { "Moved" };
        if self.all_succeeded() {
            format!(
                "{} {} file(s), {} reclaimed",
                verb,
                self.success_count(),
                bytesize::ByteSize::b(self.bytes_moved)
            )
        } else {
            format!(
                "{} {} file(s), {} failed, {} reclaimed",
                verb,
                self.success_count(),
                self.failure_count(),
                bytesize::ByteSize::b(self.bytes_moved)
            )
        }
    }
}

/// Name of the per-run relocation log written inside the quarantine root.
pub const RELOCATION_LOG_NAME: &str = "relocation_log.txt";

/// Build the quarantine directory name for a run starting at `time`.
///
/// The name is deterministic from the run's start time, e.g.
/// `Duplicates_20260807_153045`.
#[must_use]
pub fn quarantine_dir_name(time: chrono::DateTime<chrono::Local>) -> String {
    format!("Duplicates_{}", time.format("%Y%m%d_%H%M%S"))
}

/// Prefix shared by all quarantine directory names.
pub const QUARANTINE_PREFIX: &str = "Duplicates_";

/// Moves duplicate files into the quarantine directory.
pub struct Relocator {
    config: RelocateConfig,
    hasher: Hasher,
}

impl Relocator {
    /// Create a new relocator with the given configuration.
    #[must_use]
    pub fn new(config: RelocateConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Relocate the non-canonical members of every duplicate set.
    ///
    /// Sets are processed concurrently; their destinations are disjoint by
    /// construction. A failure relocating one file never aborts the rest of
    /// the batch. After the batch, a per-run log enumerating every move and
    /// failure is written inside the quarantine root.
    #[must_use]
    pub fn relocate_sets(&self, sets: &[DuplicateSet]) -> RelocateOutcome {
        let mut outcome = RelocateOutcome {
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        if sets.is_empty() {
            return outcome;
        }

        if !self.config.dry_run {
            if let Err(e) = fs::create_dir_all(&self.config.quarantine_root) {
                log::error!(
                    "Cannot create quarantine directory {}: {}",
                    self.config.quarantine_root.display(),
                    e
                );
                outcome.failures.push((
                    self.config.quarantine_root.clone(),
                    format!("cannot create quarantine directory: {e}"),
                ));
                return outcome;
            }
        }

        let per_set: Vec<(Vec<RelocationRecord>, Vec<(PathBuf, String)>, bool)> = sets
            .par_iter()
            .map(|set| self.relocate_set(set))
            .collect();

        for (records, failures, interrupted) in per_set {
            outcome.bytes_moved += records.iter().map(|r| r.size).sum::<u64>();
            outcome.relocated.extend(records);
            outcome.failures.extend(failures);
            outcome.interrupted |= interrupted;
        }

        if !self.config.dry_run {
            self.write_log(&outcome);
        }

        log::info!("{}", outcome.summary());
        outcome
    }

    /// Relocate the duplicates of a single set. The canonical member is
    /// never part of the iteration.
    fn relocate_set(
        &self,
        set: &DuplicateSet,
    ) -> (Vec<RelocationRecord>, Vec<(PathBuf, String)>, bool) {
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for file in set.duplicates() {
            if self.config.is_shutdown_requested() {
                log::debug!("Relocation: shutdown requested, skipping remaining files");
                return (records, failures, true);
            }
            match self.relocate_file(file, &set.digest) {
                Ok(record) => {
                    log::info!(
                        "Moved {} -> {}",
                        record.source.display(),
                        record.dest.display()
                    );
                    records.push(record);
                }
                Err(e) => {
                    log::warn!("Failed to relocate {}: {}", file.path.display(), e);
                    failures.push((file.path.clone(), e.to_string()));
                }
            }
        }

        (records, failures, false)
    }

    /// Move one file into quarantine, mirroring its path relative to the
    /// scan root.
    fn relocate_file(
        &self,
        file: &FileEntry,
        expected_digest: &Digest,
    ) -> Result<RelocationRecord, RelocateError> {
        let relative = file
            .path
            .strip_prefix(&self.config.scan_root)
            .map_err(|_| RelocateError::OutsideRoot {
                path: file.path.clone(),
                root: self.config.scan_root.clone(),
            })?;
        let dest = self.config.quarantine_root.join(relative);

        let record = RelocationRecord {
            source: file.path.clone(),
            dest: dest.clone(),
            size: file.size,
        };

        if self.config.dry_run {
            return Ok(record);
        }

        if dest.symlink_metadata().is_ok() {
            return Err(RelocateError::DestinationExists(dest));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RelocateError::from_io(parent.to_path_buf(), e))?;
        }

        match fs::rename(&file.path, &dest) {
            Ok(()) => Ok(record),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                self.copy_verify_delete(&file.path, &dest, file.size, expected_digest)?;
                Ok(record)
            }
            Err(e) => Err(RelocateError::from_io(file.path.clone(), e)),
        }
    }

    /// Cross-volume move: copy, verify size and digest, then delete the
    /// original. Any mismatch removes the partial destination and leaves
    /// the source untouched.
    fn copy_verify_delete(
        &self,
        source: &Path,
        dest: &Path,
        expected_size: u64,
        expected_digest: &Digest,
    ) -> Result<(), RelocateError> {
        fs::copy(source, dest).map_err(|e| RelocateError::from_io(source.to_path_buf(), e))?;

        let copied_size = fs::metadata(dest)
            .map(|m| m.len())
            .map_err(|e| RelocateError::from_io(dest.to_path_buf(), e))?;
        let verified = copied_size == expected_size
            && self
                .hasher
                .digest_file(dest)
                .is_ok_and(|d| d == *expected_digest);

        if !verified {
            if let Err(e) = fs::remove_file(dest) {
                log::error!(
                    "Could not remove unverified copy {}: {}",
                    dest.display(),
                    e
                );
            }
            return Err(RelocateError::VerificationFailed {
                src: source.to_path_buf(),
                dest: dest.to_path_buf(),
            });
        }

        if let Err(e) = fs::remove_file(source) {
            // Both copies exist at this point. Keep the source
            // authoritative and withdraw the quarantine copy.
            if let Err(cleanup) = fs::remove_file(dest) {
                log::error!(
                    "Could not remove quarantine copy {}: {}",
                    dest.display(),
                    cleanup
                );
            }
            return Err(RelocateError::from_io(source.to_path_buf(), e));
        }

        Ok(())
    }

    /// Write the per-run relocation log into the quarantine root.
    fn write_log(&self, outcome: &RelocateOutcome) {
        use std::io::Write;

        let log_path = self.config.quarantine_root.join(RELOCATION_LOG_NAME);
        let mut lines = String::new();
        for record in &outcome.relocated {
            lines.push_str(&format!(
                "MOVED {} -> {}\n",
                record.source.display(),
                record.dest.display()
            ));
        }
        for (path, reason) in &outcome.failures {
            lines.push_str(&format!("FAILED {}: {}\n", path.display(), reason));
        }

        let result = fs::File::create(&log_path).and_then(|mut f| f.write_all(lines.as_bytes()));
        if let Err(e) = result {
            log::warn!(
                "Could not write relocation log {}: {}",
                log_path.display(),
                e
            );
        }
    }
}
