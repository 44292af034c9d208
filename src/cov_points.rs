//! Coverage-point extraction from a binary's disassembly.
//!
//! The instrumented runtime records the return address of each
//! `__sanitizer_cov` call, minus one (the return address itself may be the
//! first byte of the next, unrelated coverage point). To recover the same
//! address set statically we stream the binary's `.text` disassembly and,
//! whenever the previous instruction was a call to the coverage intrinsic,
//! take the current instruction's address minus one.

use log::warn;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::domain::ToolError;

/// Disassembler used when the caller does not override the tool path.
pub const DEFAULT_OBJDUMP: &str = "objdump";

/// Operand text of a PLT-indirect call to the coverage intrinsic.
const PLT_COV_CALL: &str = "<__sanitizer_cov@plt>";
/// Operand text of a direct call to the coverage intrinsic.
const DIRECT_COV_CALL: &str = "<__sanitizer_cov>";

/// Runs a disassembler subprocess and yields instrumented call-site addresses.
#[derive(Debug, Clone)]
pub struct PointExtractor {
    tool: PathBuf,
}

impl PointExtractor {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    /// Spawn the disassembler against `binary` and return the lazy stream of
    /// coverage-point addresses, in address order.
    ///
    /// The stream is one-shot: it drains the subprocess's stdout and cannot
    /// be restarted. The tool's exit status is checked after the stream is
    /// exhausted; a non-zero exit surfaces as a final `Err` item but does not
    /// invalidate addresses already yielded.
    ///
    /// # Errors
    /// Returns [`ToolError::Spawn`] if the disassembler cannot be launched.
    pub fn extract(&self, binary: &Path) -> Result<CovPoints, ToolError> {
        let mut child = Command::new(&self.tool)
            .args(["--prefix-addresses", "-j", ".text", "-d"])
            .arg(binary)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn { tool: self.tool.display().to_string(), source })?;
        let stdout = child.stdout.take().expect("stdout is piped");
        Ok(CovPoints {
            tool: self.tool.display().to_string(),
            lines: BufReader::new(stdout).lines(),
            scanner: PointScanner::default(),
            child: Some(child),
        })
    }
}

/// Lazy stream of coverage-point addresses, backed by a one-shot subprocess.
pub struct CovPoints {
    tool: String,
    lines: Lines<BufReader<ChildStdout>>,
    scanner: PointScanner,
    child: Option<Child>,
}

impl Iterator for CovPoints {
    type Item = Result<u64, ToolError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Some(addr) = self.scanner.feed(&line) {
                        return Some(Ok(addr));
                    }
                }
                Some(Err(e)) => {
                    self.reap();
                    return Some(Err(e.into()));
                }
                None => {
                    let mut child = self.child.take()?;
                    return match child.wait() {
                        Ok(status) if status.success() => None,
                        Ok(status) => {
                            Some(Err(ToolError::Exited { tool: self.tool.clone(), status }))
                        }
                        Err(e) => Some(Err(e.into())),
                    };
                }
            }
        }
    }
}

impl CovPoints {
    /// Terminate the subprocess after a stream fault so it cannot linger.
    fn reap(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("failed to kill {}: {e}", self.tool);
            }
            let _ = child.wait();
        }
    }
}

/// Line-by-line scan state: remembers whether the previous instruction was a
/// call to the coverage intrinsic.
#[derive(Debug, Default)]
struct PointScanner {
    prev_was_cov_call: bool,
}

impl PointScanner {
    /// Feed one disassembly line; returns a coverage-point address when the
    /// previous line called the intrinsic and this line's address parses.
    fn feed(&mut self, line: &str) -> Option<u64> {
        let point = if self.prev_was_cov_call {
            leading_address(line).map(|return_addr| return_addr.wrapping_sub(1))
        } else {
            None
        };
        self.prev_was_cov_call = is_cov_call(line);
        point
    }
}

fn is_cov_call(line: &str) -> bool {
    let line = line.trim_end();
    line.ends_with(PLT_COV_CALL) || line.ends_with(DIRECT_COV_CALL)
}

/// Parse the hex address `objdump --prefix-addresses` puts first on each line.
fn leading_address(line: &str) -> Option<u64> {
    let token = line.split_whitespace().next()?;
    u64::from_str_radix(token, 16).ok()
}
