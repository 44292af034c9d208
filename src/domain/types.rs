//! Shared data types for the coverage-mapping pipeline.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// A byte offset within an instrumented binary's text section, recorded at
/// runtime when a coverage point executed. Legacy logs store 4-byte records;
/// offsets are widened to `u64` in memory so the newer 64-bit on-disk format
/// can share the type.
pub type CoverageOffset = u64;

/// Set of runtime hit-offsets for one library (duplicates collapse).
pub type OffsetSet = HashSet<CoverageOffset>;

/// Library name → merged offset set, assembled from every log file found
/// under a scan root.
pub type CoverageLog = HashMap<String, OffsetSet>;

/// Coverage-point address → resolved source locations, outer-to-inner
/// inlined frame order. A list longer than one element means the compiler
/// inlined a call chain onto that address.
pub type AddressMap = HashMap<u64, Vec<SourceLocation>>;

/// Binary filename → per-address source locations for every coverage point
/// statically found in that binary.
pub type SymbolTable = HashMap<String, AddressMap>;

/// One resolved source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Canonicalized source path as reported by the resolver.
    pub path: PathBuf,
    /// 1-based line number; 0 when the resolver reported `?`.
    pub line: u32,
    /// Distinguishes control-flow paths sharing a line; 0 when none reported.
    pub discriminator: u32,
}
