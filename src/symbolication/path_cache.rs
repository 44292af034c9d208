//! Memoized path canonicalization shared across scan workers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Per-invocation canonical-path cache.
///
/// Resolver output repeats the same handful of source paths for thousands of
/// addresses; resolving symlinks once per distinct input keeps the scan off
/// the filesystem. Owned by the scanner and shared by reference across its
/// workers, so lookups go through a lock. The cache dies with the scan — it
/// is never process-global.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: Mutex<HashMap<PathBuf, PathBuf>>,
}

impl PathCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize `path`, memoizing the answer. Idempotent; repeated calls
    /// with the same input are a map lookup. A path that does not exist on
    /// the scanning host (sources usually live elsewhere) is returned as-is.
    pub fn canonical(&self, path: &Path) -> PathBuf {
        if let Some(hit) =
            self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(path)
        {
            return hit.clone();
        }
        let real = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), real.clone());
        real
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
