//! Output formatters for scan results.
//!
//! - [`text`](self): human-readable report (this module)
//! - [`json`]: machine-readable report for scripting and tests
//!
//! Both renderers are pure: they read the result objects and produce a
//! string, with no filesystem side effects.

pub mod json;

use std::fmt::Write as _;

use bytesize::ByteSize;

use crate::actions::RelocateOutcome;
use crate::duplicates::{DuplicateSet, ScanSummary};

/// Width of the separator rule in the text report.
const RULE_WIDTH: usize = 60;

/// Human-readable text report.
///
/// Duplicate sets are rendered sorted descending by wasted space, ties
/// broken by digest, so output is identical across runs on an unchanged
/// tree. The canonical member of each set is marked `[keep]`; relocation
/// candidates are marked `[dupe]`.
pub struct TextReport<'a> {
    sets: &'a [DuplicateSet],
    summary: &'a ScanSummary,
    relocation: Option<&'a RelocateOutcome>,
}

impl<'a> TextReport<'a> {
    /// Create a report over scan results.
    #[must_use]
    pub fn new(sets: &'a [DuplicateSet], summary: &'a ScanSummary) -> Self {
        Self {
            sets,
            summary,
            relocation: None,
        }
    }

    /// Include a relocation outcome section.
    #[must_use]
    pub fn with_relocation(mut self, outcome: &'a RelocateOutcome) -> Self {
        self.relocation = Some(outcome);
        self
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        // Render order is recomputed here so the report does not depend on
        // the order the caller stored the sets in.
        let mut order: Vec<&DuplicateSet> = self.sets.iter().collect();
        order.sort_by(|a, b| {
            b.wasted_space()
                .cmp(&a.wasted_space())
                .then_with(|| a.digest.cmp(&b.digest))
        });

        if order.is_empty() {
            out.push_str("No duplicate files found.\n");
        } else {
            let _ = writeln!(out, "Found {} duplicate set(s):", order.len());
            out.push_str(&"=".repeat(RULE_WIDTH));
            out.push('\n');

            for (i, set) in order.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "\nSet #{} ({} files, {} each, {} reclaimable)",
                    i + 1,
                    set.len(),
                    ByteSize::b(set.size),
                    ByteSize::b(set.wasted_space()),
                );
                let _ = writeln!(out, "  sha256: {}", set.digest_hex());
                let _ = writeln!(out, "  [keep] {}", set.canonical().path.display());
                for dupe in set.duplicates() {
                    let _ = writeln!(out, "  [dupe] {}", dupe.path.display());
                }
            }

            out.push('\n');
            out.push_str(&"=".repeat(RULE_WIDTH));
            out.push('\n');
        }

        let _ = writeln!(
            out,
            "Scanned {} files ({}); {} duplicate set(s); {} reclaimable",
            self.summary.total_files,
            self.summary.total_size_display(),
            self.summary.duplicate_sets,
            self.summary.reclaimable_display(),
        );

        if self.summary.has_errors() {
            let _ = writeln!(
                out,
                "\nErrors encountered ({}):",
                self.summary.errors.len()
            );
            for error in &self.summary.errors {
                let _ = writeln!(out, "  - {error}");
            }
        }

        if let Some(outcome) = self.relocation {
            let verb = if outcome.dry_run { "Planned" } else { "Relocated" };
            let _ = writeln!(
                out,
                "\n{} {} file(s) ({}):",
                verb,
                outcome.success_count(),
                ByteSize::b(outcome.bytes_moved),
            );
            for record in &outcome.relocated {
                let _ = writeln!(
                    out,
                    "  {} -> {}",
                    record.source.display(),
                    record.dest.display()
                );
            }
            if !outcome.failures.is_empty() {
                let _ = writeln!(out, "\nRelocation failures ({}):", outcome.failure_count());
                for (path, reason) in &outcome.failures {
                    let _ = writeln!(out, "  - {}: {}", path.display(), reason);
                }
            }
        }

        out
    }

    /// Write the rendered report to a writer.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.render().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FileEntry;
    use std::path::PathBuf;

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size)
    }

    fn set(digest_byte: u8, size: u64, paths: &[&str]) -> DuplicateSet {
        DuplicateSet::new(
            [digest_byte; 32],
            size,
            paths.iter().map(|p| entry(p, size)).collect(),
        )
    }

    #[test]
    fn test_render_no_duplicates() {
        let summary = ScanSummary {
            total_files: 3,
            ..Default::default()
        };
        let report = TextReport::new(&[], &summary).render();

        assert!(report.contains("No duplicate files found."));
        assert!(report.contains("Scanned 3 files"));
        assert!(!report.contains("Errors encountered"));
    }

    #[test]
    fn test_render_marks_canonical() {
        let sets = vec![set(1, 4, &["/b/x.bin", "/a/x.bin"])];
        let summary = ScanSummary::default();
        let report = TextReport::new(&sets, &summary).render();

        assert!(report.contains("[keep] /a/x.bin"));
        assert!(report.contains("[dupe] /b/x.bin"));
    }

    #[test]
    fn test_render_orders_by_wasted_space() {
        // set with digest 2 wastes 200 bytes, digest 1 wastes 10
        let sets = vec![
            set(1, 10, &["/a", "/b"]),
            set(2, 100, &["/c", "/d", "/e"]),
        ];
        let summary = ScanSummary::default();
        let report = TextReport::new(&sets, &summary).render();

        let big = report.find("/c").unwrap();
        let small = report.find("/a").unwrap();
        assert!(big < small, "larger set should render first");
    }

    #[test]
    fn test_render_errors_section() {
        let summary = ScanSummary {
            errors: vec![crate::scanner::ScanError::PermissionDenied(PathBuf::from(
                "/locked",
            ))],
            ..Default::default()
        };
        let report = TextReport::new(&[], &summary).render();

        assert!(report.contains("Errors encountered (1):"));
        assert!(report.contains("Permission denied: /locked"));
    }
}
