//! Streaming addr2line subprocess driver.

use log::warn;
use std::io::{self, BufRead, BufReader, Lines, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::domain::{SourceLocation, ToolError};

/// Line resolver used when the caller does not override the tool path.
pub const DEFAULT_ADDR2LINE: &str = "addr2line";

/// One resolved inlined frame for a coverage-point address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFrame {
    pub addr: u64,
    pub location: SourceLocation,
}

/// Runs a line-resolution subprocess per binary and streams addresses
/// through it without deadlocking on pipe backpressure.
#[derive(Debug, Clone)]
pub struct Symbolicator {
    tool: PathBuf,
}

impl Symbolicator {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    /// Resolve `addresses` against `binary`, yielding one frame per inlined
    /// source location in resolver emission order.
    ///
    /// Addresses are written to the subprocess on a dedicated thread while
    /// this thread drains its output; the writer closes stdin after the last
    /// address so the stream ends deterministically. An `Err` item from the
    /// address source stops the writer and surfaces after the frames already
    /// in flight. The subprocess's exit status is awaited before the stream
    /// yields its final item.
    ///
    /// # Errors
    /// Returns [`ToolError::Spawn`] if the resolver cannot be launched.
    pub fn resolve<I>(&self, binary: &Path, addresses: I) -> Result<ResolvedFrames, ToolError>
    where
        I: IntoIterator<Item = Result<u64, ToolError>>,
        I::IntoIter: Send + 'static,
    {
        let tool = self.tool.display().to_string();
        let mut child = Command::new(&self.tool)
            .arg("-ia")
            .arg("-e")
            .arg(binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn { tool: tool.clone(), source })?;
        let mut stdin = child.stdin.take().expect("stdin is piped");
        let stdout = child.stdout.take().expect("stdout is piped");

        let addresses = addresses.into_iter();
        let writer = thread::spawn(move || -> Result<(), ToolError> {
            for addr in addresses {
                let addr = addr?;
                writeln!(stdin, "{addr:#x}")?;
                stdin.flush()?;
            }
            // stdin drops here, closing the pipe so the resolver terminates.
            Ok(())
        });

        Ok(ResolvedFrames {
            tool,
            lines: BufReader::new(stdout).lines(),
            parser: FrameParser::default(),
            child: Some(child),
            writer: Some(writer),
        })
    }
}

/// Lazy stream of resolved frames, backed by a one-shot subprocess.
pub struct ResolvedFrames {
    tool: String,
    lines: Lines<BufReader<ChildStdout>>,
    parser: FrameParser,
    child: Option<Child>,
    writer: Option<JoinHandle<Result<(), ToolError>>>,
}

impl Iterator for ResolvedFrames {
    type Item = Result<ResolvedFrame, ToolError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next() {
                Some(Ok(line)) => match self.parser.feed(&line) {
                    Ok(Some(frame)) => return Some(Ok(frame)),
                    Ok(None) => {}
                    Err(e) => {
                        self.abort();
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.abort();
                    return Some(Err(e.into()));
                }
                None => return self.finish().map(Err),
            }
        }
    }
}

impl ResolvedFrames {
    /// Join the writer and await the subprocess after the output stream is
    /// exhausted. Returns the first fault, if any; runs once.
    fn finish(&mut self) -> Option<ToolError> {
        if let Some(handle) = self.writer.take() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.abort();
                    return Some(e);
                }
                Err(_) => {
                    self.abort();
                    return Some(ToolError::Io(io::Error::other(
                        "address writer thread panicked",
                    )));
                }
            }
        }
        let mut child = self.child.take()?;
        match child.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(ToolError::Exited { tool: self.tool.clone(), status }),
            Err(e) => Some(e.into()),
        }
    }

    /// Tear down both halves after a fault so neither can block the other.
    fn abort(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("failed to kill {}: {e}", self.tool);
            }
            let _ = child.wait();
        }
        if let Some(handle) = self.writer.take() {
            // The killed subprocess closed its stdin; the writer unblocks
            // with a broken pipe and exits.
            let _ = handle.join();
        }
    }
}

/// Incremental parser for the resolver's address-echo/frame grammar.
#[derive(Debug, Default)]
struct FrameParser {
    current: Option<u64>,
}

impl FrameParser {
    fn feed(&mut self, line: &str) -> Result<Option<ResolvedFrame>, ToolError> {
        let line = line.trim_end();
        if let Some(addr) = address_echo(line) {
            self.current = Some(addr);
            return Ok(None);
        }
        let Some(addr) = self.current else {
            return Err(ToolError::FrameBeforeAddress { line: line.to_string() });
        };
        let location = parse_frame_line(line)?;
        Ok(Some(ResolvedFrame { addr, location }))
    }
}

/// An address echo starts with `0x` and carries no `path:line` colon.
fn address_echo(line: &str) -> Option<u64> {
    if !line.starts_with("0x") || line.contains(':') {
        return None;
    }
    u64::from_str_radix(&line[2..], 16).ok()
}

/// Parse `path:line` or `path:line (discriminator N)`; `?` means line 0.
fn parse_frame_line(line: &str) -> Result<SourceLocation, ToolError> {
    let malformed = || ToolError::MalformedFrame { line: line.to_string() };

    let (body, discriminator) = match line
        .strip_suffix(')')
        .and_then(|stripped| stripped.rsplit_once(" (discriminator "))
    {
        Some((body, disc)) => (body, disc.parse::<u32>().map_err(|_| malformed())?),
        None => (line, 0),
    };

    let (path, line_no) = body.rsplit_once(':').ok_or_else(malformed)?;
    let line_no =
        if line_no == "?" { 0 } else { line_no.parse::<u32>().map_err(|_| malformed())? };

    Ok(SourceLocation { path: PathBuf::from(path), line: line_no, discriminator })
}
