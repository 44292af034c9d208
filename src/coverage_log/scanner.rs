//! Directory-tree scan for coverage log files.

use anyhow::{ensure, Context, Result};
use log::warn;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::decoder::decode_offsets;
use crate::domain::{CoverageLog, LogError, OffsetSet};

/// Reserved suffix marking a file as a coverage log.
pub const LOG_SUFFIX: &str = ".sancov";

/// Recursively collect every coverage log under `root` into one map.
///
/// Logs sharing a library name (separate processes writing
/// `libfoo.<pid>.sancov` files) merge into a single offset set. A file that
/// cannot be read or decoded is logged and skipped; it never aborts the scan.
///
/// # Errors
/// Returns an error only for the root itself (missing or not a directory) —
/// that is a caller configuration problem, not a per-file fault.
pub fn scan_log_tree(root: &Path) -> Result<CoverageLog> {
    let meta = fs::metadata(root)
        .with_context(|| format!("cannot read coverage log root {}", root.display()))?;
    ensure!(meta.is_dir(), "coverage log root {} is not a directory", root.display());

    let mut log = CoverageLog::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(filename) = entry.file_name().to_str() else {
            continue;
        };
        if !filename.ends_with(LOG_SUFFIX) {
            continue;
        }
        let library = library_name(filename).to_string();
        let offsets = log.entry(library).or_default();
        if let Err(e) = decode_log_file(entry.path(), offsets) {
            warn!("skipping {}: {e}", entry.path().display());
        }
    }
    Ok(log)
}

fn decode_log_file(path: &Path, into: &mut OffsetSet) -> Result<(), LogError> {
    let blob = fs::read(path)?;
    decode_offsets(&blob, into)
}

/// Derive the library name by stripping the last two dot-separated components
/// (`libfoo.12345.sancov` → `libfoo`).
pub(crate) fn library_name(filename: &str) -> &str {
    let mut end = filename.len();
    for _ in 0..2 {
        match filename[..end].rfind('.') {
            Some(dot) => end = dot,
            None => break,
        }
    }
    &filename[..end]
}
