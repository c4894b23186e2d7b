// src/engine/worker.rs
// =============================================================================
// Workers: take a target, wait for a permit, request it, report the outcome.
//
// Every worker runs the same loop and they all pull from the same job queue,
// so each target is handled by exactly one of them. A worker has at most one
// request outstanding, which caps the number of requests in flight at the
// size of the pool.
//
// A failed request is just another result. Nothing a single target does can
// stop its worker or the rest of the pool.
// =============================================================================

use crate::engine::limiter::Permits;
use async_channel::Receiver;
use reqwest::Client;
use serde::Serialize;
use std::error::Error as StdError;
use tokio::sync::mpsc::Sender;
use tracing::{debug, trace, warn};

const LIMITER_STOPPED: &str = "rate limiter stopped before the request was sent";

/// What happened when we requested one target
///
/// Exactly one of the two: the server answered with a status code, or the
/// request never got an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProbeOutcome {
    /// The server answered with this HTTP status
    Status { status: u16 },
    /// Transport failure (DNS, refused connection, timeout, bad URL)
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// The target URL that was requested
    pub url: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            outcome: ProbeOutcome::Status { status },
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: ProbeOutcome::Failed {
                error: error.into(),
            },
        }
    }

    /// HTTP status if the request got an answer
    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            ProbeOutcome::Status { status } => Some(status),
            ProbeOutcome::Failed { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

// Requests one URL and turns whatever happens into a ProbeResult
//
// The client carries the per-request timeout, so a slow server ends up here
// as a timeout error after at most that long.
pub async fn probe(client: &Client, url: String) -> ProbeResult {
    match client.get(&url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            // Only the status matters, release the connection right away
            drop(response);
            ProbeResult::status(url, status)
        }
        Err(e) => ProbeResult::failed(url, describe_error(&e)),
    }
}

// reqwest's own message is terse ("error sending request for url ..."),
// the interesting part (timeout, DNS, refused) sits in its source chain
fn describe_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// The worker loop
//
// Ends when the job queue is closed and drained, or when nobody is reading
// results any more. Every target taken off the queue gets a result: if the
// rate limiter is gone, the target is reported as failed without a request.
pub async fn run_worker(
    id: usize,
    client: Client,
    jobs: Receiver<String>,
    permits: Permits,
    results: Sender<ProbeResult>,
) -> usize {
    debug!(worker = id, "worker started");
    let mut handled = 0;

    while let Ok(url) = jobs.recv().await {
        let result = if permits.acquire().await {
            trace!(worker = id, %url, "requesting");
            probe(&client, url).await
        } else {
            warn!(worker = id, %url, "rate limiter stopped, target not requested");
            ProbeResult::failed(url, LIMITER_STOPPED)
        };
        handled += 1;

        if results.send(result).await.is_err() {
            debug!(worker = id, "result queue closed, worker exiting");
            break;
        }
    }

    debug!(worker = id, handled, "worker finished");
    handled
}
