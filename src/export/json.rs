//! JSON serialization of scan results.

use serde::Serialize;
use std::io::Write;

use crate::domain::{CoverageLog, ExportError, SymbolTable};

/// Both pipeline outputs, bundled for one report file.
#[derive(Serialize)]
pub struct ScanReport<'a> {
    /// Library → runtime hit-offsets.
    pub coverage: &'a CoverageLog,
    /// Binary → coverage-point address → source locations.
    pub symbols: &'a SymbolTable,
}

impl ScanReport<'_> {
    /// Write the report as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or the underlying write fails.
    pub fn export<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
