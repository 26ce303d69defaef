//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting file metadata for duplicate detection.
//!
//! Excluded directory names prune their entire subtree via
//! `filter_entry`, so a prior quarantine folder is never descended into at
//! all. Symbolic links are not followed, which prevents traversal cycles
//! and double-counting of content.
//!
//! Per-file failures (a file disappearing between enumeration and stat, an
//! unreadable directory) are yielded as [`ScanError`] items rather than
//! terminating the walk.
//!
//! # Example
//!
//! ```no_run
//! use dupvault::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_excluded_names([".git"]);
//! let walker = Walker::new(Path::new("/home/user/photos"), config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Single-threaded recursive file discovery.
///
/// Emission order is not part of the contract; downstream stages group by
/// size and digest and pick canonical members by path content, never by
/// discovery order.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path, config: WalkerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag becomes `true` the walk stops yielding new entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns a lazy iterator over [`FileEntry`] results. Errors are
    /// yielded as [`ScanError`] values rather than stopping iteration;
    /// callers log them and continue.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let shutdown = self.shutdown_flag.clone();

        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| {
                // Prune excluded subtrees without descending into them.
                // The root itself is always kept so scanning a directory
                // whose own name is excluded still works.
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                if self.config.is_excluded(entry.file_name()) {
                    log::debug!("Skipping excluded directory: {}", entry.path().display());
                    return false;
                }
                true
            })
            .take_while(move |_| {
                let requested = shutdown
                    .as_ref()
                    .is_some_and(|f| f.load(Ordering::SeqCst));
                if requested {
                    log::debug!("Walker: shutdown requested, stopping iteration");
                }
                !requested
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    // Symlinks are never followed; skip the link itself too
                    if entry.file_type().is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }
                    if !entry.file_type().is_file() {
                        return None;
                    }

                    match entry.metadata() {
                        Ok(metadata) => Some(Ok(FileEntry::new(
                            entry.path().to_path_buf(),
                            metadata.len(),
                        ))),
                        Err(e) => {
                            let path = entry.path().to_path_buf();
                            let err = match e.into_io_error() {
                                Some(io) => ScanError::from_io(path, io),
                                None => ScanError::NotFound(path),
                            };
                            log::warn!("Skipping file: {}", err);
                            Some(Err(err))
                        }
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    let err = match e.into_io_error() {
                        Some(io) => ScanError::from_io(path, io),
                        None => ScanError::NotFound(path),
                    };
                    log::warn!("Scan error: {}", err);
                    Some(Err(err))
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn touch(path: &Path, content: &[u8]) {
        File::create(path).unwrap().write_all(content).unwrap();
    }

    #[test]
    fn test_walk_collects_regular_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.txt"), b"aaa");
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        touch(&sub.join("b.txt"), b"bbbb");

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let mut files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].size, 3);
        assert_eq!(files[1].size, 4);
    }

    #[test]
    fn test_walk_prunes_excluded_subtree() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("keep.txt"), b"x");
        let skipped = dir.path().join("Duplicates_20250101_000000");
        fs::create_dir(&skipped).unwrap();
        touch(&skipped.join("old.txt"), b"x");
        let nested = skipped.join("deep");
        fs::create_dir(&nested).unwrap();
        touch(&nested.join("deeper.txt"), b"x");

        let config =
            WalkerConfig::default().with_excluded_names(["Duplicates_20250101_000000"]);
        let walker = Walker::new(dir.path(), config);
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("keep.txt"));
    }

    #[test]
    fn test_walk_excluded_name_matches_anywhere_in_tree() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("node_modules");
        fs::create_dir_all(&nested).unwrap();
        touch(&nested.join("dep.js"), b"x");
        touch(&dir.path().join("a").join("app.js"), b"x");

        let config = WalkerConfig::default().with_excluded_names(["node_modules"]);
        let walker = Walker::new(dir.path(), config);
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("app.js"));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_symlinks() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("real.txt"), b"data");
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("real.txt"));
    }

    #[test]
    fn test_walk_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        for i in 0..10 {
            touch(&dir.path().join(format!("f{i}.txt")), b"x");
        }

        let flag = Arc::new(AtomicBool::new(true));
        let walker =
            Walker::new(dir.path(), WalkerConfig::default()).with_shutdown_flag(flag);

        assert_eq!(walker.walk().count(), 0);
    }
}
