// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// dirfuzz has a single command: take a URL template containing FUZZ and a
// wordlist, then probe every substitution. The flags map directly onto
// ScanConfig (see config.rs), which validates them before any network
// activity begins.
// =============================================================================

use crate::config::{DEFAULT_RATE, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};
use clap::Parser;
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "dirfuzz",
    version = "0.1.0",
    about = "Discover directories and endpoints by fuzzing a URL template with a wordlist",
    long_about = "dirfuzz replaces every FUZZ in the URL template with each word of the wordlist, \
                  requests the result and prints every URL that did not answer 404 Not Found. \
                  Requests are spread over a fixed pool of workers and capped by a global rate."
)]
pub struct Cli {
    /// URL template to fuzz (e.g. http://example.com/FUZZ)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: String,

    /// Path to the wordlist file, one word per line
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: PathBuf,

    /// Number of concurrent workers
    #[arg(short = 't', long = "threads", default_value_t = DEFAULT_WORKERS)]
    pub threads: usize,

    /// Global cap on requests per second, shared by all workers
    #[arg(long, default_value_t = DEFAULT_RATE)]
    pub rate: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Print results as JSON lines instead of text
    #[arg(long)]
    pub json: bool,

    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
