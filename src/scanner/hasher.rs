//! SHA-256 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing SHA-256 digests
//! of file contents. Files are read in fixed-size chunks so memory use stays
//! O(chunk size) regardless of file size.
//!
//! # Example
//!
//! ```no_run
//! use dupvault::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest_file(Path::new("/some/file.bin")).unwrap();
//! println!("{}", dupvault::scanner::digest_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest as _, Sha256};

use super::HashError;

/// A 256-bit content digest.
pub type Digest = [u8; 32];

/// Default read buffer size: 1 MiB.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Convert a digest to its lowercase hexadecimal representation.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    use std::fmt::Write;

    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Streaming SHA-256 hasher.
///
/// Stateless apart from configuration; a single instance can be shared
/// across worker threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 1 MiB chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Override the read buffer size (clamped to at least 4 KiB).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(4096);
        self
    }

    /// Compute the SHA-256 digest of a file's content.
    ///
    /// The file is read in `chunk_size` increments; the worker thread owns
    /// the file handle exclusively for the duration of the computation.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// mid-stream. Such a file is excluded from duplicate consideration by
    /// the caller.
    pub fn digest_file(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file =
            File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let read = file
                .read(&mut buffer)
                .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(hasher.finalize().into())
    }
}
