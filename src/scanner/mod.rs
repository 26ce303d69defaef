//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Recursive directory walking with subtree exclusion
//! - Streaming SHA-256 content hashing
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: SHA-256 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupvault::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_excluded_names(["node_modules"]);
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

// Re-export main types
pub use hasher::{digest_to_hex, Digest, Hasher, CHUNK_SIZE};
pub use walker::Walker;

/// Metadata for a discovered file.
///
/// The digest starts out unset and is only populated for files whose size
/// collides with at least one other file, so size-unique files are never read.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path to the file, immutable once recorded
    pub path: PathBuf,
    /// File size in bytes, from a single stat call
    pub size: u64,
    /// SHA-256 content digest, populated by the hashing stage
    pub digest: Option<Digest>,
}

impl FileEntry {
    /// Create a new entry with no digest computed yet.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            digest: None,
        }
    }

    /// Consume the entry, returning it with the digest populated.
    #[must_use]
    pub fn with_digest(mut self, digest: Digest) -> Self {
        self.digest = Some(digest);
        self
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Directory names whose subtrees are pruned entirely.
    ///
    /// Matching is by file name, not full path, so prior quarantine
    /// directories are skipped wherever they appear in the tree.
    pub excluded_names: HashSet<OsString>,
}

impl WalkerConfig {
    /// Add directory names to the exclusion set.
    #[must_use]
    pub fn with_excluded_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.excluded_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Check whether a directory name is excluded.
    #[must_use]
    pub fn is_excluded(&self, name: &std::ffi::OsStr) -> bool {
        self.excluded_names.contains(name)
    }
}

/// Errors that can occur during directory scanning.
///
/// These are per-file conditions: callers log them, record them in the run
/// summary, and keep scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path disappeared between enumeration and stat.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Build a scan error from an I/O error, classifying by kind.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Errors that can occur while hashing a file's content.
///
/// A hashing failure excludes the file from duplicate consideration but is
/// never fatal to the run.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Build a hash error from an I/O error, classifying by kind.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_new() {
        let entry = FileEntry::new(PathBuf::from("/test/file.txt"), 1024);

        assert_eq!(entry.path, PathBuf::from("/test/file.txt"));
        assert_eq!(entry.size, 1024);
        assert!(entry.digest.is_none());
    }

    #[test]
    fn test_file_entry_with_digest() {
        let entry = FileEntry::new(PathBuf::from("/a"), 4).with_digest([7u8; 32]);
        assert_eq!(entry.digest, Some([7u8; 32]));
    }

    #[test]
    fn test_walker_config_exclusion() {
        let config = WalkerConfig::default().with_excluded_names([".git", "node_modules"]);

        assert!(config.is_excluded(std::ffi::OsStr::new(".git")));
        assert!(config.is_excluded(std::ffi::OsStr::new("node_modules")));
        assert!(!config.is_excluded(std::ffi::OsStr::new("src")));
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "Permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");
    }

    #[test]
    fn test_hash_error_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = HashError::from_io(PathBuf::from("/secret"), io);
        assert!(matches!(err, HashError::PermissionDenied(_)));
    }
}
