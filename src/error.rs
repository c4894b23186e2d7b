// src/error.rs
// =============================================================================
// Errors that stop a scan before it starts, or break it from inside.
//
// Anything that goes wrong for a single target (DNS failure, refused
// connection, timeout) is NOT an error here - it becomes a ProbeResult and is
// printed inline. Only setup problems and a crashed background task live in
// this enum, and every one of them ends the process with exit code 1.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The worker pool needs at least one worker
    #[error("number of workers must be at least 1")]
    NoWorkers,

    /// A rate of zero would never emit a tick
    #[error("rate must be at least 1 request per second")]
    ZeroRate,

    /// Faster than this the tick period rounds down to zero
    #[error("rate must be at most {max} requests per second")]
    RateTooHigh { max: u32 },

    #[error("request timeout must be at least 1 second")]
    ZeroTimeout,

    /// The wordlist file could not be opened or read
    #[error("failed to read wordlist '{}'", .path.display())]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shared HTTP client could not be constructed
    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),

    /// A background task of the scan (rate limiter, supervisor) died
    #[error("{task} task failed")]
    TaskFailed {
        task: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}
