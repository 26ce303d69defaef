//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable output for scripting and for assertions in
//! tests.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "digest": "ab12...",
//!       "size": 1024,
//!       "canonical": "/path/to/keep.txt",
//!       "files": ["/path/to/keep.txt", "/path/to/dupe.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_sets": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "hashed_files": 30,
//!     "eliminated_by_size": 70,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0
//!   },
//!   "errors": ["Permission denied: /locked"],
//!   "relocations": [{"source": "...", "dest": "...", "size": 1024}]
//! }
//! ```

use serde::Serialize;

use crate::actions::{RelocateOutcome, RelocationRecord};
use crate::duplicates::{DuplicateSet, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate set in JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateSet {
    /// SHA-256 digest as a 64-character hexadecimal string
    pub digest: String,
    /// File size in bytes
    pub size: u64,
    /// Path of the canonical (preserved) member
    pub canonical: String,
    /// Paths of all members, canonical first
    pub files: Vec<String>,
}

impl JsonDuplicateSet {
    /// Convert a [`DuplicateSet`].
    #[must_use]
    pub fn from_set(set: &DuplicateSet) -> Self {
        Self {
            digest: set.digest_hex(),
            size: set.size,
            canonical: set.canonical().path.display().to_string(),
            files: set
                .files
                .iter()
                .map(|f| f.path.display().to_string())
                .collect(),
        }
    }
}

/// Summary statistics in JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Number of duplicate files (excluding canonical members)
    pub duplicate_files: usize,
    /// Space reclaimable by relocating duplicates (bytes)
    pub reclaimable_space: u64,
    /// Number of files whose content was hashed
    pub hashed_files: usize,
    /// Number of files skipped by the size prefilter
    pub eliminated_by_size: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Process exit code for this run
    pub exit_code: i32,
}

impl JsonSummary {
    /// Convert a [`ScanSummary`] plus the run's exit code.
    #[must_use]
    pub fn from_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            duplicate_sets: summary.duplicate_sets,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            hashed_files: summary.hashed_files,
            eliminated_by_size: summary.eliminated_by_size,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
        }
    }
}

/// A relocation record in JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRelocation {
    /// Original location
    pub source: String,
    /// Location inside the quarantine directory
    pub dest: String,
    /// File size in bytes
    pub size: u64,
}

impl JsonRelocation {
    fn from_record(record: &RelocationRecord) -> Self {
        Self {
            source: record.source.display().to_string(),
            dest: record.dest.display().to_string(),
            size: record.size,
        }
    }
}

/// Complete JSON document for one run.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// Duplicate sets, in report order
    pub duplicates: Vec<JsonDuplicateSet>,
    /// Summary statistics
    pub summary: JsonSummary,
    /// Per-file error messages
    pub errors: Vec<String>,
    /// Completed (or planned) relocations
    pub relocations: Vec<JsonRelocation>,
    /// Relocation failures as `path: reason` strings
    pub relocation_failures: Vec<String>,
}

impl JsonOutput {
    /// Build the document from scan results.
    #[must_use]
    pub fn new(sets: &[DuplicateSet], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: sets.iter().map(JsonDuplicateSet::from_set).collect(),
            summary: JsonSummary::from_summary(summary, exit_code),
            errors: summary.errors.iter().map(ToString::to_string).collect(),
            relocations: Vec::new(),
            relocation_failures: Vec::new(),
        }
    }

    /// Attach a relocation outcome.
    #[must_use]
    pub fn with_relocation(mut self, outcome: &RelocateOutcome) -> Self {
        self.relocations = outcome
            .relocated
            .iter()
            .map(JsonRelocation::from_record)
            .collect();
        self.relocation_failures = outcome
            .failures
            .iter()
            .map(|(path, reason)| format!("{}: {}", path.display(), reason))
            .collect();
        self
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FileEntry;
    use std::path::PathBuf;

    #[test]
    fn test_json_output_schema() {
        let sets = vec![DuplicateSet::new(
            [0xab; 32],
            4,
            vec![
                FileEntry::new(PathBuf::from("/b/x.bin"), 4),
                FileEntry::new(PathBuf::from("/a/x.bin"), 4),
            ],
        )];
        let summary = ScanSummary {
            total_files: 3,
            duplicate_sets: 1,
            duplicate_files: 1,
            reclaimable_space: 4,
            ..Default::default()
        };

        let output = JsonOutput::new(&sets, &summary, ExitCode::Success);
        let json = output.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total_files"], 3);
        assert_eq!(value["summary"]["exit_code"], 0);
        assert_eq!(value["duplicates"][0]["canonical"], "/a/x.bin");
        assert_eq!(value["duplicates"][0]["files"][0], "/a/x.bin");
        assert_eq!(
            value["duplicates"][0]["digest"]
                .as_str()
                .unwrap()
                .len(),
            64
        );
    }

    #[test]
    fn test_json_errors_listed() {
        let summary = ScanSummary {
            errors: vec![crate::scanner::ScanError::PermissionDenied(PathBuf::from(
                "/locked",
            ))],
            ..Default::default()
        };

        let output = JsonOutput::new(&[], &summary, ExitCode::PartialSuccess);
        let value: serde_json::Value =
            serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(value["errors"][0], "Permission denied: /locked");
        assert_eq!(value["summary"]["exit_code"], 3);
    }
}
