//! # covmap - Main Entry Point
//!
//! Thin driver around the scanning pipeline: parses arguments, runs the
//! coverage-log and/or binary scans, prints a short summary, and optionally
//! writes both maps to a JSON report. Intersecting the maps is the caller's
//! business, not ours.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;

use covmap::binary_scan::BinaryScanner;
use covmap::cli::Args;
use covmap::cov_points::PointExtractor;
use covmap::coverage_log::scan_log_tree;
use covmap::domain::{CoverageLog, SymbolTable};
use covmap::export::ScanReport;
use covmap::symbolication::Symbolicator;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().to_lowercase().contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.logs.is_none() && args.bins.is_none() {
        anyhow::bail!(
            "Missing required argument: --logs or --bins\n\n\
             Usage:\n  \
             covmap --logs <DIR>             Decode and merge coverage logs\n  \
             covmap --bins <DIR>             Extract and symbolicate binaries\n\n\
             Run 'covmap --help' for more options"
        );
    }

    let mut coverage = CoverageLog::new();
    if let Some(ref root) = args.logs {
        coverage = scan_log_tree(root)?;
        if !args.quiet {
            let mut libraries: Vec<_> = coverage.iter().collect();
            libraries.sort_by_key(|(name, _)| name.as_str());
            for (name, offsets) in libraries {
                println!("{name}: {} hit offsets", offsets.len());
            }
        }
    }

    let mut symbols = SymbolTable::new();
    if let Some(ref root) = args.bins {
        let scanner = BinaryScanner::new(
            PointExtractor::new(&args.objdump),
            Symbolicator::new(&args.addr2line),
            args.jobs,
        );
        symbols = scanner.scan(root)?;
        if !args.quiet {
            let mut binaries: Vec<_> = symbols.iter().collect();
            binaries.sort_by_key(|(name, _)| name.as_str());
            for (name, addrs) in binaries {
                println!("{name}: {} coverage points", addrs.len());
            }
        }
    }

    if let Some(ref path) = args.export {
        let file = File::create(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        ScanReport { coverage: &coverage, symbols: &symbols }
            .export(BufWriter::new(file))
            .context("failed to write report")?;
        if !args.quiet {
            println!("saved: {}", path.display());
        }
    }

    Ok(())
}
