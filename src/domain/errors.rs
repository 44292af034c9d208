//! Structured error types for covmap
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Each enum maps to one handling policy: `LogError` is skip-and-log at the
//! file level, `ToolError` is fatal for the binary being processed but never
//! for the scan as a whole, `ExportError` propagates to the caller.

use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("coverage log is {len} bytes, not a multiple of the {width}-byte record width")]
    TruncatedRecord { len: usize, width: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}")]
    Exited { tool: String, status: ExitStatus },

    #[error("resolver emitted a frame before any address echo: {line:?}")]
    FrameBeforeAddress { line: String },

    #[error("unparseable resolver frame: {line:?}")]
    MalformedFrame { line: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
