// src/engine/collector.rs
// =============================================================================
// Drains the result queue and prints what is worth printing.
//
//   failure      -> "Error: <url> - <message>"
//   status 404   -> nothing (not interesting)
//   other status -> "Found: <url> - Status: <code>"
//
// Lines come out in the order requests finish, not in wordlist order.
// =============================================================================

use crate::config::OutputFormat;
use crate::engine::worker::{ProbeOutcome, ProbeResult};
use anyhow::Result;
use std::io::Write;
use tokio::sync::mpsc::Receiver;

/// Counts of everything the collector saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Every result received, reported or not
    pub total: usize,
    /// Non-404 responses
    pub found: usize,
    pub errors: usize,
    /// 404 responses that were suppressed
    pub filtered: usize,
}

// Consumes results until the queue is closed, writing one line per
// reported result to `out`
pub async fn collect<W: Write>(
    results: &mut Receiver<ProbeResult>,
    out: &mut W,
    format: OutputFormat,
) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();

    while let Some(result) = results.recv().await {
        summary.total += 1;
        match &result.outcome {
            ProbeOutcome::Failed { .. } => summary.errors += 1,
            ProbeOutcome::Status { .. } if result.is_not_found() => {
                summary.filtered += 1;
                continue;
            }
            ProbeOutcome::Status { .. } => summary.found += 1,
        }

        write_result(out, &result, format)?;
        out.flush()?;
    }

    Ok(summary)
}

fn write_result<W: Write>(out: &mut W, result: &ProbeResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, result)?;
            writeln!(out)?;
        }
        OutputFormat::Text => match &result.outcome {
            ProbeOutcome::Failed { error } => writeln!(out, "Error: {} - {}", result.url, error)?,
            ProbeOutcome::Status { status } => {
                writeln!(out, "Found: {} - Status: {}", result.url, status)?
            }
        },
    }
    Ok(())
}
