//! # covmap - SanitizerCoverage → source-line correlation
//!
//! covmap answers one question: given the raw hit-offset logs an instrumented
//! binary wrote at runtime, and the binary itself, which source file / line /
//! inlined-frame combinations were executed? None of its inputs carry source
//! information directly, so the answer is reconstructed from three loosely
//! documented formats: the packed-integer runtime log, call-site heuristics
//! over a disassembly stream, and the line-oriented protocol of an external
//! resolver.
//!
//! ## Architecture Overview
//!
//! ```text
//!  runtime logs (*.sancov)          instrumented binaries (ELF)
//!        │                                   │
//!        ▼                                   ▼
//!  ┌──────────────┐                  ┌──────────────┐
//!  │ coverage_log │                  │ binary_scan  │ worker pool
//!  │ decode+merge │                  └──────┬───────┘
//!  └──────┬───────┘                         │ per binary
//!         │                    ┌────────────┴────────────┐
//!         │                    ▼                         ▼
//!         │             ┌────────────┐           ┌───────────────┐
//!         │             │ cov_points │ addresses │ symbolication │
//!         │             │ (objdump)  ├──────────▶│ (addr2line)   │
//!         │             └────────────┘           └───────┬───────┘
//!         ▼                                              ▼
//!  CoverageLog                                     SymbolTable
//!  library → {offsets}              binary → address → [source locations]
//! ```
//!
//! The two outputs cover the same conceptual dataset from opposite sides —
//! what *was* hit at runtime vs. what *could* be hit statically. Intersecting
//! them is deliberately left to the caller; the core only builds the maps.
//!
//! ## Module Structure
//!
//! - [`coverage_log`]: decode raw offset blobs, merge a tree of per-library
//!   log files into one [`domain::CoverageLog`]
//! - [`cov_points`]: disassembler subprocess + call-site scan yielding each
//!   instrumented address (return address − 1, matching the runtime log)
//! - [`symbolication`]: addr2line subprocess with a dedicated writer thread
//!   (pipe-deadlock avoidance), inlined-frame expansion, path memoization
//! - [`binary_scan`]: ELF discovery and the bounded worker pool assembling
//!   the final [`domain::SymbolTable`]
//! - [`export`]: JSON dump of both maps for offline intersection
//! - [`domain`]: shared types and the structured error enums
//! - [`cli`]: command-line argument parsing
//!
//! All state is rebuilt per invocation; nothing is cached across runs.

pub mod binary_scan;
pub mod cli;
pub mod cov_points;
pub mod coverage_log;
pub mod domain;
pub mod export;
pub mod symbolication;
