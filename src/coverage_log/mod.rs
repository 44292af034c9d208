//! Runtime coverage-log ingestion
//!
//! SanitizerCoverage leaves one binary log file per library per process run,
//! named `<library>.<pid>.sancov`, containing the raw hit-offsets the runtime
//! recorded. This module decodes those blobs ([`decoder`]) and merges a whole
//! directory tree of them into one [`CoverageLog`](crate::domain::CoverageLog)
//! ([`scanner`]).

pub mod decoder;
pub mod scanner;

pub use decoder::{decode_offsets, LogFormat};
pub use scanner::{scan_log_tree, LOG_SUFFIX};
