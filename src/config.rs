// src/config.rs
// =============================================================================
// Validated scan settings.
//
// The CLI hands us raw numbers; ScanConfig is what the engine actually runs
// with. Converting from Cli is the one place where zero workers, a zero rate
// or a zero timeout get rejected, so the engine never has to re-check them.
// =============================================================================

use crate::cli::Cli;
use crate::error::ScanError;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_RATE: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One tick per nanosecond; above this the tick period would be zero
pub const MAX_RATE: u32 = 1_000_000_000;

const USER_AGENT: &str = concat!("dirfuzz/", env!("CARGO_PKG_VERSION"));

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `Found: <url> - Status: <code>` / `Error: <url> - <message>`
    #[default]
    Text,
    /// One JSON object per reported result
    Json,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// URL template; every FUZZ is replaced by a word
    pub template: String,
    /// Size of the worker pool, also the capacity of both queues
    pub workers: usize,
    /// Global requests-per-second cap
    pub rate: u32,
    /// Timeout applied to each request on its own
    pub timeout: Duration,
    pub user_agent: String,
    pub format: OutputFormat,
}

impl ScanConfig {
    /// Settings with the CLI defaults for the given template
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            workers: DEFAULT_WORKERS,
            rate: DEFAULT_RATE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            format: OutputFormat::Text,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Rejects settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.workers == 0 {
            return Err(ScanError::NoWorkers);
        }
        if self.rate == 0 {
            return Err(ScanError::ZeroRate);
        }
        if self.rate > MAX_RATE {
            return Err(ScanError::RateTooHigh { max: MAX_RATE });
        }
        if self.timeout.is_zero() {
            return Err(ScanError::ZeroTimeout);
        }
        Ok(())
    }
}

impl TryFrom<&Cli> for ScanConfig {
    type Error = ScanError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let format = if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let config = ScanConfig::new(cli.url.clone())
            .with_workers(cli.threads)
            .with_rate(cli.rate)
            .with_timeout(Duration::from_secs(cli.timeout))
            .with_format(format);

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["dirfuzz", "-u", "http://x.test/FUZZ", "-w", "words.txt"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_from_cli_defaults() {
        let config = ScanConfig::try_from(&parse(&[])).unwrap();
        assert_eq!(config.template, "http://x.test/FUZZ");
        assert_eq!(config.workers, 10);
        assert_eq!(config.rate, 10);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.user_agent.starts_with("dirfuzz/"));
    }

    #[test]
    fn test_from_cli_json() {
        let config = ScanConfig::try_from(&parse(&["--json"])).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = ScanConfig::try_from(&parse(&["-t", "0"])).unwrap_err();
        assert!(matches!(err, ScanError::NoWorkers));
    }

    #[test]
    fn test_zero_rate_rejected() {
        let err = ScanConfig::try_from(&parse(&["--rate", "0"])).unwrap_err();
        assert!(matches!(err, ScanError::ZeroRate));
    }

    #[test]
    fn test_rate_above_max_rejected() {
        let err = ScanConfig::try_from(&parse(&["--rate", "2000000000"])).unwrap_err();
        assert!(matches!(err, ScanError::RateTooHigh { max: MAX_RATE }));
    }

    #[test]
    fn test_max_rate_accepted() {
        let config = ScanConfig::new("http://x.test/FUZZ").with_rate(MAX_RATE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ScanConfig::try_from(&parse(&["--timeout", "0"])).unwrap_err();
        assert!(matches!(err, ScanError::ZeroTimeout));
    }
}
