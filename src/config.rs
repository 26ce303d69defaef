//! Application configuration and startup validation.
//!
//! Configuration errors are the only fatal error class: they are reported
//! before any scanning starts. Everything after validation recovers
//! per-file.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::actions::QUARANTINE_PREFIX;

/// Directory names excluded from every scan.
///
/// Covers common tool output that is never interesting for deduplication;
/// prior quarantine directories are discovered separately by
/// [`discover_prior_quarantines`].
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".venv", "__pycache__", "node_modules", "target"];

/// Errors raised by configuration validation. Fatal; nothing is scanned.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The scan root does not exist.
    #[error("scan root not found: {0}")]
    RootNotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("scan root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// The worker count must be at least 1.
    #[error("worker count must be greater than zero")]
    ZeroWorkers,
}

/// Validated configuration for one engine run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory to scan.
    pub root: PathBuf,
    /// Directory names whose subtrees are skipped.
    pub exclude: HashSet<OsString>,
    /// Hashing worker threads.
    pub workers: usize,
    /// Quarantine directory for this run.
    pub quarantine_root: PathBuf,
    /// Perform relocation after reporting.
    pub relocate: bool,
    /// With `relocate`, plan moves without touching the filesystem.
    pub dry_run: bool,
}

impl AppConfig {
    /// Build a configuration with defaults for the given root.
    ///
    /// The exclusion set starts from [`DEFAULT_EXCLUDES`] plus any
    /// pre-existing quarantine directories at the root, so a re-run never
    /// re-scans a prior run's output.
    #[must_use]
    pub fn new(root: PathBuf, quarantine_root: PathBuf) -> Self {
        let mut exclude: HashSet<OsString> =
            DEFAULT_EXCLUDES.iter().map(OsString::from).collect();
        exclude.extend(discover_prior_quarantines(&root));
        if let Some(name) = quarantine_root.file_name() {
            exclude.insert(name.to_os_string());
        }

        Self {
            root,
            exclude,
            workers: crate::duplicates::default_worker_count(),
            quarantine_root,
            relocate: false,
            dry_run: false,
        }
    }

    /// Add directory names to the exclusion set.
    #[must_use]
    pub fn with_excluded_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the hashing worker count (validated, not clamped).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable relocation of duplicates into quarantine.
    #[must_use]
    pub fn with_relocate(mut self, relocate: bool) -> Self {
        self.relocate = relocate;
        self
    }

    /// Enable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing or non-directory root, or a
    /// zero worker count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.exists() {
            return Err(ConfigError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ConfigError::RootNotADirectory(self.root.clone()));
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }
}

/// Find quarantine directories from previous runs at the top level of the
/// root.
///
/// Unreadable directories are ignored; this is a best-effort convenience,
/// and validation will surface a truly broken root.
#[must_use]
pub fn discover_prior_quarantines(root: &std::path::Path) -> Vec<OsString> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name())
        .filter(|name| name.to_string_lossy().starts_with(QUARANTINE_PREFIX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_accepts_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::new(dir.path().to_path_buf(), dir.path().join("Duplicates_x"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let config = AppConfig::new(missing.clone(), missing.join("q"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        let config = AppConfig::new(file, dir.path().join("q"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RootNotADirectory(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let dir = tempdir().unwrap();
        let config = AppConfig::new(dir.path().to_path_buf(), dir.path().join("q"))
            .with_workers(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWorkers)));
    }

    #[test]
    fn test_discovers_prior_quarantines() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Duplicates_20250101_101010")).unwrap();
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::write(dir.path().join("Duplicates_notadir"), b"x").unwrap();

        let found = discover_prior_quarantines(dir.path());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0], OsString::from("Duplicates_20250101_101010"));
    }

    #[test]
    fn test_new_excludes_own_quarantine_name() {
        let dir = tempdir().unwrap();
        let config = AppConfig::new(
            dir.path().to_path_buf(),
            dir.path().join("Duplicates_20260807_120000"),
        );
        assert!(config
            .exclude
            .contains(&OsString::from("Duplicates_20260807_120000")));
        assert!(config.exclude.contains(&OsString::from(".git")));
    }
}
