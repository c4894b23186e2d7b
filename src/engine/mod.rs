// src/engine/mod.rs
// =============================================================================
// The scan engine: wires the job source, rate limiter, worker pool and
// result collector together.
//
//   job source --(bounded job queue)--> N workers --(result queue)--> collector
//                                          ^
//                                          | one permit per request
//                                     rate limiter
//
// Shutdown runs back to front:
// 1. the job source closes the job queue after the last target
// 2. each worker exits once the queue is closed and empty
// 3. the supervisor waits for every worker, then stops the rate limiter and
//    reports it if the limiter had crashed
// 4. the result queue closes when the last worker drops its sender, so the
//    collector sees the end only after every worker has stopped
//
// Submodules:
// - jobs: target generation + feeding the job queue
// - limiter: the global rate limiter
// - worker: the per-worker loop and the HTTP probe
// - collector: draining and printing results
// =============================================================================

mod collector;
mod jobs;
mod limiter;
mod worker;

pub use collector::{collect, ScanSummary};
pub use jobs::{build_target, PLACEHOLDER};
pub use limiter::{Permits, RateLimiter};
pub use worker::{ProbeOutcome, ProbeResult};

use crate::config::ScanConfig;
use crate::error::ScanError;
use reqwest::Client;
use std::io::Write;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

/// A configured scanner, holding the HTTP client shared by all workers
pub struct Scanner {
    config: ScanConfig,
    client: Client,
}

/// A scan in progress
///
/// Results can be pulled with `recv()` until it returns None; `finish()`
/// then waits for the supervisor.
pub struct ScanHandle {
    results: mpsc::Receiver<ProbeResult>,
    supervisor: JoinHandle<Result<usize, ScanError>>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;

        // One client for the whole pool: it is reference counted
        // internally and shares its connection pool across clones
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { config, client })
    }

    /// Spawns the job source, the workers and the supervisor
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(&self, words: Vec<String>) -> ScanHandle {
        let workers = self.config.workers;
        if !self.config.template.contains(PLACEHOLDER) {
            warn!(
                template = %self.config.template,
                "URL template has no {} placeholder, every request will hit the same URL",
                PLACEHOLDER
            );
        }
        info!(
            words = words.len(),
            workers,
            rate = self.config.rate,
            "starting scan"
        );

        let (job_tx, job_rx) = async_channel::bounded(workers);
        let (result_tx, result_rx) = mpsc::channel(workers);
        let limiter = RateLimiter::start(self.config.rate);

        tokio::spawn(jobs::feed(self.config.template.clone(), words, job_tx));

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(worker::run_worker(
                id,
                self.client.clone(),
                job_rx.clone(),
                limiter.permits(),
                result_tx.clone(),
            ));
        }
        // Only the workers hold result senders from here on
        drop(result_tx);
        drop(job_rx);

        let supervisor = tokio::spawn(supervise(pool, limiter));

        ScanHandle {
            results: result_rx,
            supervisor,
        }
    }

    /// Runs a whole scan, writing reported results to `out`
    pub async fn run<W: Write>(
        &self,
        words: Vec<String>,
        out: &mut W,
    ) -> anyhow::Result<ScanSummary> {
        let mut handle = self.start(words);
        let summary = collect(&mut handle.results, out, self.config.format).await;
        // A write error leaves the workers blocked on a full result queue,
        // dropping the receiver lets them exit
        let finished = handle.finish().await;
        let summary = summary?;
        finished?;
        Ok(summary)
    }
}

impl ScanHandle {
    pub async fn recv(&mut self) -> Option<ProbeResult> {
        self.results.recv().await
    }

    /// Waits for the supervisor after closing our end of the result queue
    ///
    /// Returns the number of targets the workers handled.
    pub async fn finish(self) -> Result<usize, ScanError> {
        let ScanHandle { results, supervisor } = self;
        drop(results);
        supervisor.await.map_err(|source| ScanError::TaskFailed {
            task: "supervisor",
            source,
        })?
    }
}

// Join barrier for the pool: returns once every worker has stopped
async fn supervise(
    mut pool: JoinSet<usize>,
    mut limiter: RateLimiter,
) -> Result<usize, ScanError> {
    let mut handled = 0;
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(count) => handled += count,
            Err(e) => warn!(error = %e, "worker task failed"),
        }
    }
    info!(handled, "all workers finished");

    limiter.shutdown().await.map_err(|source| {
        error!(error = %source, "rate limiter crashed during the scan");
        ScanError::TaskFailed {
            task: "rate limiter",
            source,
        }
    })?;
    Ok(handled)
}
