// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr only, stdout is reserved for results)
// 3. Validate the settings and load the wordlist
// 4. Run the scan, printing results as they arrive
// 5. Exit with proper code (0 = scan completed, 1 = bad usage or setup error)
//
// Failed requests never change the exit code: they are printed as
// "Error: ..." lines and the scan carries on.
// =============================================================================

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use dirfuzz::cli::Cli;
use dirfuzz::{load_wordlist, ScanConfig, Scanner};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // The context of each step leads, e.g. "Error loading wordlist: ..."
            eprintln!("{:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Everything that can fail before the scan starts returns Err here and
// ends with exit code 1; a scan that ran to completion is Ok(0)
async fn run(cli: Cli) -> Result<i32> {
    let config = ScanConfig::try_from(&cli).context("Invalid configuration")?;

    let words = load_wordlist(&cli.wordlist).context("Error loading wordlist")?;

    let scanner = Scanner::new(config).context("Error setting up the scan")?;

    let mut stdout = std::io::stdout();
    let summary = scanner
        .run(words, &mut stdout)
        .await
        .context("Scan failed")?;

    info!(
        total = summary.total,
        found = summary.found,
        errors = summary.errors,
        filtered = summary.filtered,
        "scan complete"
    );

    Ok(0)
}

// RUST_LOG wins when set; otherwise -v flags pick the level for our crate
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,dirfuzz=info",
        2 => "warn,dirfuzz=debug",
        _ => "warn,dirfuzz=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
