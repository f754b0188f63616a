use super::*;
use std::fs::{self, FileTimes};
use tempfile::tempdir;

#[test]
fn rotate_logs_renames_only_non_empty_active_logs() {
    let tmp = tempdir().expect("tempdir");
    let logs_dir = tmp.path();

    fs::write(logs_dir.join("api-server.log"), b"line one\n").expect("write non-empty log");
    fs::write(logs_dir.join("worker.log"), b"").expect("write empty log");

    rotate_logs(logs_dir, &["api-server", "worker"], DEFAULT_RETENTION);

    assert!(!logs_dir.join("api-server.log").exists());
    assert!(logs_dir.join("worker.log").exists(), "empty log must not be rotated away");

    let rotated: Vec<_> = fs::read_dir(logs_dir)
        .expect("read_dir")
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("api-server.log."))
        .collect();
    assert_eq!(rotated.len(), 1);
}

#[test]
fn rotate_logs_prunes_rotated_files_older_than_retention() {
    let tmp = tempdir().expect("tempdir");
    let logs_dir = tmp.path();

    let old_rotated = logs_dir.join("api-server.log.2020-01-01-000000");
    fs::write(&old_rotated, b"ancient").expect("write old rotated log");
    let old_mtime = std::time::SystemTime::now() - Duration::from_secs(8 * 24 * 3600);
    let file = fs::OpenOptions::new().write(true).open(&old_rotated).expect("open for mtime");
    file.set_times(FileTimes::new().set_modified(old_mtime)).expect("set mtime");

    let recent_rotated = logs_dir.join("api-server.log.2026-07-01-000000");
    fs::write(&recent_rotated, b"recent").expect("write recent rotated log");

    rotate_logs(logs_dir, &[], DEFAULT_RETENTION);

    assert!(!old_rotated.exists(), "rotated log older than retention should be pruned");
    assert!(recent_rotated.exists(), "recent rotated log should survive pruning");
}

#[test]
fn rotate_logs_honors_a_shorter_configured_retention() {
    let tmp = tempdir().expect("tempdir");
    let logs_dir = tmp.path();

    let rotated = logs_dir.join("api-server.log.2026-07-29-000000");
    fs::write(&rotated, b"two days old").expect("write rotated log");
    let mtime = std::time::SystemTime::now() - Duration::from_secs(2 * 24 * 3600);
    let file = fs::OpenOptions::new().write(true).open(&rotated).expect("open for mtime");
    file.set_times(FileTimes::new().set_modified(mtime)).expect("set mtime");

    rotate_logs(logs_dir, &[], Duration::from_secs(24 * 3600));

    assert!(!rotated.exists(), "a 2-day-old rotated log must be pruned under a 1-day retention");
}

#[test]
fn rotate_logs_tolerates_a_missing_active_log() {
    let tmp = tempdir().expect("tempdir");
    // Must not panic or error when the base name has no active log yet.
    rotate_logs(tmp.path(), &["never-started"], DEFAULT_RETENTION);
}

#[yare::parameterized(
    rotated_log = { "api-server.log.2026-07-01-000000", true },
    rotated_worker = { "workflow-worker.log.2020-01-01-120000", true },
    active_log = { "api-server.log", false },
    active_err = { "api-server.err", false },
    unrelated = { "README.md", false },
)]
fn is_rotated_recognizes_the_dotted_timestamp_suffix(name: &str, expected: bool) {
    assert_eq!(is_rotated(name), expected);
}
