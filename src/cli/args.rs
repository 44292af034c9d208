//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::cov_points::DEFAULT_OBJDUMP;
use crate::symbolication::DEFAULT_ADDR2LINE;

#[derive(Parser)]
#[command(
    name = "covmap",
    about = "Correlate SanitizerCoverage hit logs with source lines",
    after_help = "\
EXAMPLES:
    covmap --logs ./cov-out --bins ./build          Scan both trees
    covmap --bins ./build --export report.json      Symbol table only, as JSON
    covmap --logs ./cov-out -q                      Coverage log only, no summary"
)]
pub struct Args {
    /// Directory tree containing .sancov coverage log files
    #[arg(long, value_name = "DIR")]
    pub logs: Option<PathBuf>,

    /// Directory tree containing instrumented ELF binaries
    #[arg(long, value_name = "DIR")]
    pub bins: Option<PathBuf>,

    /// Worker threads for binary processing (default: available parallelism)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Disassembler executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OBJDUMP)]
    pub objdump: PathBuf,

    /// Line-resolution executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ADDR2LINE)]
    pub addr2line: PathBuf,

    /// Write both maps to a JSON report file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Suppress the stdout summary
    #[arg(short, long)]
    pub quiet: bool,
}
