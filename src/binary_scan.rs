//! Binary discovery and parallel symbolication.
//!
//! Walks a directory tree, sniffs out ELF binaries by magic bytes, and runs
//! the extract→resolve pipeline for each on a bounded worker pool, folding
//! the results into one [`SymbolTable`].

use anyhow::{ensure, Context, Result};
use crossbeam_channel::unbounded;
use log::{error, info, warn};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;
use walkdir::WalkDir;

use crate::cov_points::PointExtractor;
use crate::domain::{AddressMap, SymbolTable};
use crate::symbolication::{PathCache, Symbolicator};

/// First four bytes of every ELF file.
pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// Drives coverage-point extraction and symbolication over a tree of
/// binaries.
pub struct BinaryScanner {
    extractor: PointExtractor,
    symbolicator: Symbolicator,
    jobs: usize,
}

impl BinaryScanner {
    /// `jobs` bounds the worker pool; `None` uses the host's available
    /// parallelism. Size 1 is the sequential mode — same code path, one
    /// worker.
    pub fn new(extractor: PointExtractor, symbolicator: Symbolicator, jobs: Option<usize>) -> Self {
        let jobs = jobs
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, NonZeroUsize::get))
            .max(1);
        Self { extractor, symbolicator, jobs }
    }

    /// Walk `root` and build the filename → address → source-locations table.
    ///
    /// Binaries are identified by the ELF magic; a basename already claimed
    /// by an earlier directory level is logged and skipped (commonly the same
    /// library linked into multiple trees). A failure processing one binary
    /// is logged and leaves that binary's entry wholly absent; it never
    /// aborts the scan. There is no timeout on the external tools — a hung
    /// tool hangs its worker.
    ///
    /// # Errors
    /// Returns an error only for the root itself (missing or not a
    /// directory).
    pub fn scan(&self, root: &Path) -> Result<SymbolTable> {
        let meta = fs::metadata(root)
            .with_context(|| format!("cannot read binary root {}", root.display()))?;
        ensure!(meta.is_dir(), "binary root {} is not a directory", root.display());

        // Claim basenames during the walk so "first encountered wins" is
        // deterministic regardless of worker completion order.
        let mut seen: HashSet<String> = HashSet::new();
        let mut pending: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_elf_file(entry.path()) {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !seen.insert(filename.clone()) {
                warn!(
                    "duplicate binary name {filename} at {}, keeping the first \
                     (same library linked into multiple trees?)",
                    entry.path().display()
                );
                continue;
            }
            pending.push((filename, entry.into_path()));
        }

        let (job_tx, job_rx) = unbounded();
        let (result_tx, result_rx) = unbounded::<(String, AddressMap)>();
        for job in pending {
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let cache = PathCache::new();
        let mut table = SymbolTable::new();
        thread::scope(|s| {
            for _ in 0..self.jobs {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cache = &cache;
                s.spawn(move || {
                    for (filename, path) in job_rx {
                        match self.process_binary(&path, cache) {
                            Ok(map) => {
                                let _ = result_tx.send((filename, map));
                            }
                            Err(e) => error!("failed to process {}: {e:#}", path.display()),
                        }
                    }
                });
            }
            drop(result_tx);

            // Each filename is produced by exactly one worker, so plain
            // insertion is enough; arrival order does not matter.
            for (filename, map) in result_rx {
                table.insert(filename, map);
            }
        });
        Ok(table)
    }

    /// Extract coverage points from one binary and fold its resolved frames
    /// into a per-address map.
    fn process_binary(&self, path: &Path, cache: &PathCache) -> Result<AddressMap> {
        info!("processing {}", path.display());
        let points = self
            .extractor
            .extract(path)
            .with_context(|| format!("extracting coverage points from {}", path.display()))?;

        let mut map = AddressMap::new();
        let frames = self
            .symbolicator
            .resolve(path, points)
            .with_context(|| format!("symbolicating {}", path.display()))?;
        for frame in frames {
            let frame = frame?;
            let mut location = frame.location;
            location.path = cache.canonical(&location.path);
            map.entry(frame.addr).or_default().push(location);
        }
        info!("done {}", path.display());
        Ok(map)
    }
}

/// True iff the file starts with the ELF magic signature.
fn is_elf_file(path: &Path) -> bool {
    let mut magic = [0u8; 4];
    match File::open(path).and_then(|mut f| f.read_exact(&mut magic)) {
        Ok(()) => magic == ELF_MAGIC,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_elf_file() {
        let dir = tempfile::tempdir().unwrap();

        let elf = dir.path().join("bin");
        File::create(&elf).unwrap().write_all(b"\x7FELF\x02\x01\x01").unwrap();
        assert!(is_elf_file(&elf));

        let text = dir.path().join("notes.txt");
        File::create(&text).unwrap().write_all(b"hello").unwrap();
        assert!(!is_elf_file(&text));

        // Too short to carry the magic at all.
        let tiny = dir.path().join("tiny");
        File::create(&tiny).unwrap().write_all(b"\x7FE").unwrap();
        assert!(!is_elf_file(&tiny));

        assert!(!is_elf_file(&dir.path().join("missing")));
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let scanner = BinaryScanner::new(
            PointExtractor::new("objdump"),
            Symbolicator::new("addr2line"),
            Some(1),
        );
        assert!(scanner.scan(Path::new("/no/such/root")).is_err());
    }
}
