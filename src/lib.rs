// src/lib.rs
// =============================================================================
// dirfuzz as a library: everything main.rs needs, usable from other code.
//
// Modules:
// - cli: command-line flags (clap)
// - config: validated scan settings built from the flags
// - engine: job source, rate limiter, worker pool, result collector
// - error: setup errors that stop a scan before it starts
// - wordlist: reading the wordlist file
// =============================================================================

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod wordlist;

pub use config::{OutputFormat, ScanConfig};
pub use engine::{ProbeOutcome, ProbeResult, ScanHandle, ScanSummary, Scanner};
pub use error::ScanError;
pub use wordlist::load_wordlist;
