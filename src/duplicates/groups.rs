//! Size-based grouping and duplicate set management.
//!
//! # Overview
//!
//! Size grouping is the cost-reduction prefilter of duplicate detection:
//! content equality implies size equality, so a file whose size is unique in
//! the tree can be excluded from hashing with certainty. Only groups with
//! two or more members proceed to the hashing stage.
//!
//! # Example
//!
//! ```
//! use dupvault::scanner::FileEntry;
//! use dupvault::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;

use crate::scanner::{digest_to_hex, Digest, FileEntry};

/// Group files by size, keeping only groups with 2+ members.
///
/// This must run only after the walk has fully completed, since duplicate
/// candidacy requires knowing the full cohort of files at each size.
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<u64, Vec<FileEntry>>` - size groups with 2+ members
/// - [`GroupingStats`] - how many files were eliminated as size-unique
#[must_use]
pub fn group_by_size(files: Vec<FileEntry>) -> (HashMap<u64, Vec<FileEntry>>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: files.len(),
        ..Default::default()
    };

    let mut groups: HashMap<u64, Vec<FileEntry>> = HashMap::new();
    for file in files {
        stats.total_size += file.size;
        groups.entry(file.size).or_default().push(file);
    }
    stats.unique_sizes = groups.len();

    let groups: HashMap<u64, Vec<FileEntry>> = groups
        .into_iter()
        .filter(|(_, members)| {
            if members.len() > 1 {
                stats.potential_duplicates += members.len();
                stats.duplicate_groups += 1;
                true
            } else {
                stats.eliminated_unique += 1;
                false
            }
        })
        .collect();

    (groups, stats)
}

/// Statistics from the size grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as size-unique (never hashed)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Confirmed set of files with identical size and content digest.
///
/// Members are kept sorted by path, and the canonical member is always the
/// lexicographically smallest path. This makes canonical selection
/// reproducible across runs on an unchanged filesystem, independent of
/// discovery or hash-completion order.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    /// SHA-256 digest shared by every member
    pub digest: Digest,
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Members, sorted by path; the first is canonical
    pub files: Vec<FileEntry>,
}

impl DuplicateSet {
    /// Create a new duplicate set.
    ///
    /// Members are sorted by path on construction; callers may pass them in
    /// any order (hash jobs complete out of order).
    #[must_use]
    pub fn new(digest: Digest, size: u64, mut files: Vec<FileEntry>) -> Self {
        debug_assert!(files.len() >= 2, "a duplicate set needs at least 2 members");
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            digest,
            size,
            files,
        }
    }

    /// The member preserved in place: the lexicographically smallest path.
    #[must_use]
    pub fn canonical(&self) -> &FileEntry {
        &self.files[0]
    }

    /// All members except the canonical one; these are relocation candidates.
    #[must_use]
    pub fn duplicates(&self) -> &[FileEntry] {
        &self.files[1..]
    }

    /// Number of files in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total minus the canonical member).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space reclaimable by relocating all non-canonical members.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as a hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }
}
