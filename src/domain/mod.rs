//! Domain model for covmap
//!
//! Core data types shared by the scanning pipeline plus the structured
//! error enums consumed by the per-site skip-vs-propagate policies.

pub mod errors;
pub mod types;

pub use errors::{ExportError, LogError, ToolError};
pub use types::{AddressMap, CoverageLog, CoverageOffset, OffsetSet, SourceLocation, SymbolTable};
