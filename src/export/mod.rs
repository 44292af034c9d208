//! Scan-result export
//!
//! Serializes the two maps the pipeline builds — the runtime coverage log and
//! the static symbol table — so a caller can intersect them offline. The
//! pipeline itself never performs that intersection.

pub mod json;

pub use json::ScanReport;
