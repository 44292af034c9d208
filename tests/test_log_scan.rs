//! Integration tests for the coverage-log tree scan: decoding, merging of
//! same-library logs, and per-file fault isolation.

use covmap::coverage_log::scan_log_tree;
use std::fs;
use std::path::Path;

fn write_log(dir: &Path, name: &str, offsets: &[u32]) {
    let blob: Vec<u8> = offsets.iter().flat_map(|o| o.to_ne_bytes()).collect();
    fs::write(dir.join(name), blob).unwrap();
}

#[test]
fn test_same_library_logs_merge() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "liba.1.sancov", &[10, 20]);

    // A second process wrote its own log for the same library, one level down.
    let sub = dir.path().join("run2");
    fs::create_dir(&sub).unwrap();
    write_log(&sub, "liba.2.sancov", &[20, 30]);

    let log = scan_log_tree(dir.path()).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log["liba"], [10, 20, 30].into_iter().collect());
}

#[test]
fn test_malformed_log_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "liba.1.sancov", &[10]);
    fs::write(dir.path().join("libbad.1.sancov"), b"\xAA\xBB\xCC").unwrap();

    let log = scan_log_tree(dir.path()).unwrap();
    assert_eq!(log["liba"], [10].into_iter().collect());
    // The malformed file contributed nothing, but the library was seen.
    assert!(log["libbad"].is_empty());
}

#[test]
fn test_non_log_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "liba.1.sancov", &[10]);
    fs::write(dir.path().join("README"), "not a log").unwrap();
    fs::write(dir.path().join("liba.1.sancov.bak"), "not a log either").unwrap();

    let log = scan_log_tree(dir.path()).unwrap();
    assert_eq!(log.len(), 1);
}

#[test]
fn test_missing_root_is_an_error() {
    assert!(scan_log_tree(Path::new("/no/such/dir")).is_err());
}

#[test]
fn test_file_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "x").unwrap();
    assert!(scan_log_tree(&file).is_err());
}
