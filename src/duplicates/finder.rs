//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - enumerate files under the root (single-threaded)
//! 2. **Size grouping** - drop files whose size is unique (see
//!    [`crate::duplicates::groups`])
//! 3. **Hashing** - SHA-256 digests across a bounded rayon pool
//! 4. **Digest grouping** - emit a [`DuplicateSet`] per digest with 2+ files
//!
//! Per-file errors never abort the run; they accumulate in the returned
//! [`ScanSummary`] and surface in the final report.
//!
//! # Example
//!
//! ```no_run
//! use dupvault::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("Found {} duplicate sets", sets.len());
//! println!("Reclaimable: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::scanner::{Digest, FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig};

use super::{group_by_size, DuplicateSet};

/// Default worker count: the host's available parallelism.
#[must_use]
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of worker threads for parallel hashing.
    ///
    /// Bounded so concurrent open file handles and disk I/O stay bounded;
    /// unbounded concurrency against spinning storage degrades throughput.
    pub workers: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing worker threads (at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
///
/// The explicit result object threaded through the pipeline; there is no
/// module-level accumulation anywhere.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files discovered by the walk
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (never hashed)
    pub eliminated_by_size: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (excluded from duplicate sets)
    pub failed_files: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Number of duplicate files (excluding canonical members)
    pub duplicate_files: usize,
    /// Total space reclaimable by relocating duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: std::time::Duration,
    /// Per-file errors encountered during the scan
    pub errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Format reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }

    /// Whether any per-file error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
///
/// Unlike [`ScanError`], these abort the run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred during scanning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupvault::duplicates::DuplicateFinder;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(Path::new(".")) {
///     Ok((sets, summary)) => {
///         println!("{} sets, {} reclaimable", sets.len(), summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Arc::new(Hasher::new()),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given root.
    ///
    /// Runs the complete pipeline and returns confirmed duplicate sets,
    /// sorted descending by wasted space (ties broken by digest), along
    /// with summary statistics.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the root does not exist, is not a
    /// directory, or the scan is interrupted. Per-file errors do NOT abort
    /// the run; they are collected in the summary.
    pub fn find_duplicates(
        &self,
        path: &std::path::Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let mut summary = ScanSummary::default();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Stage 1: walk the tree. Must complete before hashing starts,
        // since duplicate candidacy requires the full size cohort.
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("scanning", 0);
            callback.on_message(&format!("Scanning {}", path.display()));
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(e) => summary.errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("scanning");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Found {} files", files.len());

        // Stage 2: size prefilter.
        let (size_groups, size_stats) = group_by_size(files);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Size grouping: {} of {} files eliminated ({:.1}%)",
            size_stats.eliminated_unique,
            size_stats.total_files,
            size_stats.elimination_rate()
        );

        if size_groups.is_empty() {
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        // Stage 3: hash remaining candidates on a bounded pool.
        let (digest_groups, interrupted) = self.hash_candidates(size_groups, &mut summary);
        if interrupted {
            return Err(FinderError::Interrupted);
        }

        // Stage 4: emit duplicate sets, deterministically ordered.
        let mut sets: Vec<DuplicateSet> = digest_groups
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(digest, members)| {
                let size = members.first().map_or(0, |f| f.size);
                log::debug!(
                    "Duplicate set {}: {} files, {} bytes each",
                    crate::scanner::digest_to_hex(&digest),
                    members.len(),
                    size
                );
                DuplicateSet::new(digest, size, members)
            })
            .collect();
        sets.sort_by(|a, b| {
            b.wasted_space()
                .cmp(&a.wasted_space())
                .then_with(|| a.digest.cmp(&b.digest))
        });

        summary.duplicate_sets = sets.len();
        summary.duplicate_files = sets.iter().map(DuplicateSet::duplicate_count).sum();
        summary.reclaimable_space = sets.iter().map(DuplicateSet::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} sets, {} duplicate files, {} reclaimable",
            summary.duplicate_sets,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((sets, summary))
    }

    /// Hash all size-collision candidates across the bounded worker pool.
    ///
    /// Completion order is unconstrained; grouping is by digest value, so
    /// out-of-order arrival is harmless. Returns the digest groups and
    /// whether the stage observed a shutdown request.
    fn hash_candidates(
        &self,
        size_groups: HashMap<u64, Vec<FileEntry>>,
        summary: &mut ScanSummary,
    ) -> (HashMap<Digest, Vec<FileEntry>>, bool) {
        let candidates: Vec<FileEntry> = size_groups.into_values().flatten().collect();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", candidates.len());
        }
        log::info!("Hashing {} candidate files", candidates.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .unwrap_or_else(|_| {
                log::warn!(
                    "Failed to create bounded thread pool, using fallback with {} threads",
                    rayon::current_num_threads()
                );
                rayon::ThreadPoolBuilder::new().build().unwrap()
            });

        let hasher = self.hasher.clone();
        let config = &self.config;

        // None marks a file skipped because shutdown was requested before
        // its job was dispatched; in-flight reads always run to completion.
        let results: Vec<Option<(FileEntry, Result<Digest, HashError>)>> = pool.install(|| {
            candidates
                .into_par_iter()
                .enumerate()
                .map(|(idx, file)| {
                    if config.is_shutdown_requested() {
                        return None;
                    }
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
                    }
                    let result = hasher.digest_file(&file.path);
                    if result.is_ok() {
                        if let Some(ref callback) = config.progress_callback {
                            callback.on_item_completed(file.size);
                        }
                    }
                    Some((file, result))
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        let mut groups: HashMap<Digest, Vec<FileEntry>> = HashMap::new();
        let mut skipped = false;
        for result in results {
            let Some((file, outcome)) = result else {
                skipped = true;
                continue;
            };
            match outcome {
                Ok(digest) => {
                    summary.hashed_files += 1;
                    groups.entry(digest).or_default().push(file.with_digest(digest));
                }
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                    summary.failed_files += 1;
                    summary.errors.push(ScanError::Hash(e));
                }
            }
        }

        let interrupted = skipped || self.config.is_shutdown_requested();
        if interrupted {
            log::info!("Hashing interrupted by shutdown signal");
        }
        (groups, interrupted)
    }
}
