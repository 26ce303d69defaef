//! Per-file errors must never abort a run; they surface in the summary and
//! the affected files drop out of duplicate consideration.

use dupvault::duplicates::DuplicateFinder;
use dupvault::output::TextReport;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

/// Permission-based tests are meaningless when the process can bypass
/// file modes (root does).
#[cfg(unix)]
fn permissions_enforced(path: &Path) -> bool {
    File::open(path).is_err()
}

#[cfg(unix)]
fn chmod(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported_not_fatal() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"same-size");
    write_file(&dir.path().join("b.txt"), b"same-size");
    write_file(&dir.path().join("locked.txt"), b"same-size");
    chmod(&dir.path().join("locked.txt"), 0o000);

    if !permissions_enforced(&dir.path().join("locked.txt")) {
        chmod(&dir.path().join("locked.txt"), 0o644);
        eprintln!("skipping: permissions not enforced for this user");
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    // The run completed, the readable pair still matched, and the
    // unreadable file is in no set.
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
    assert!(sets[0]
        .files
        .iter()
        .all(|f| !f.path.ends_with("locked.txt")));

    assert_eq!(summary.failed_files, 1);
    assert!(summary.has_errors());

    // The report renders a distinct errors section.
    let report = TextReport::new(&sets, &summary).render();
    assert!(report.contains("Errors encountered (1):"));
    assert!(report.contains("locked.txt"));

    chmod(&dir.path().join("locked.txt"), 0o644);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_skipped_with_error() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"pair");
    write_file(&dir.path().join("b.txt"), b"pair");
    let sealed = dir.path().join("sealed");
    write_file(&sealed.join("inner.txt"), b"pair");
    chmod(&sealed, 0o000);

    if fs::read_dir(&sealed).is_ok() {
        chmod(&sealed, 0o755);
        eprintln!("skipping: permissions not enforced for this user");
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert!(summary.has_errors());

    chmod(&sealed, 0o755);
}

#[test]
fn test_file_deleted_between_scan_and_hash_is_reported() {
    // The race itself is hard to stage deterministically, but the same
    // recovery path runs when a set member disappears before relocation.
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"pair");
    write_file(&dir.path().join("b.txt"), b"pair");

    let finder = DuplicateFinder::with_defaults();
    let (sets, _) = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(sets.len(), 1);

    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let quarantine = dir.path().join("Duplicates_20260807_130000");
    let outcome = dupvault::actions::Relocator::new(dupvault::actions::RelocateConfig::new(
        dir.path().to_path_buf(),
        quarantine,
    ))
    .relocate_sets(&sets);

    assert_eq!(outcome.failure_count(), 1);
    assert_eq!(outcome.success_count(), 0);
    assert!(dir.path().join("a.txt").exists());
}

#[test]
fn test_error_free_run_has_empty_errors_section() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"pair");
    write_file(&dir.path().join("b.txt"), b"pair");

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(!summary.has_errors());
    let report = TextReport::new(&sets, &summary).render();
    assert!(!report.contains("Errors encountered"));
}
