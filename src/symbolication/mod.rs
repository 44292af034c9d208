//! # Address symbolication via an external line resolver
//!
//! Converts coverage-point addresses into source locations by streaming them
//! through an `addr2line`-style subprocess in inlined-frames mode. None of the
//! pipeline's inputs carry source information directly — the resolver is the
//! only oracle — so this module is where binary addresses finally become
//! `path:line` tuples.
//!
//! ## The pipe deadlock
//!
//! The naive approach — write every address to the resolver's stdin, then
//! read its stdout — deadlocks as soon as the address volume exceeds the OS
//! pipe buffer: the resolver blocks writing results nobody is draining, we
//! block writing addresses it will never read. [`resolver`] therefore feeds
//! stdin from a dedicated writer thread while the calling thread drains
//! stdout, and closes stdin after the last address so the resolver terminates
//! its output deterministically.
//!
//! ## Output grammar
//!
//! ```text
//! 0x401009                     ← address echo (starts a group)
//! /src/app/inline.h:7 (discriminator 2)
//! /src/app/main.c:99           ← frames accumulate until the next echo
//! ```
//!
//! A line number of `?` means "unknown" and maps to 0. Frames within one
//! group are emitted outer-to-inner by the resolver and kept in that order.
//!
//! [`path_cache`] memoizes path canonicalization across all binaries of a
//! scan, since many coverage points resolve to the same handful of sources.

pub mod path_cache;
pub mod resolver;

pub use path_cache::PathCache;
pub use resolver::{ResolvedFrame, Symbolicator, DEFAULT_ADDR2LINE};
