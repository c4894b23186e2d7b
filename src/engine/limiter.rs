// src/engine/limiter.rs
// =============================================================================
// A global rate limiter built from a ticker and a one-slot channel.
//
// A background task ticks every 1/rate seconds and tries to drop one permit
// into a channel of capacity 1. Workers pull permits out of that channel, so
// each tick is taken by exactly one worker no matter how many are waiting.
// That is what makes the cap global: ten workers at rate 10 still make ten
// requests per second in total, not a hundred.
//
// If nobody takes a permit before the next tick, the new tick is simply
// dropped (the slot is already full). Permits never pile up, so idle time
// does not turn into a burst later.
// =============================================================================

use async_channel::{Receiver, TrySendError};
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Owns the ticker task. Stopping (or dropping) it ends the ticks.
#[derive(Debug)]
pub struct RateLimiter {
    permits: Receiver<()>,
    ticker: JoinHandle<()>,
}

/// Cloneable handle workers use to wait for their turn
#[derive(Debug, Clone)]
pub struct Permits {
    rx: Receiver<()>,
}

impl RateLimiter {
    /// Starts ticking at `rate_per_second`; the first permit is available at once
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(rate_per_second: u32) -> Self {
        Self::with_period(tick_period(rate_per_second))
    }

    /// Starts ticking every `period`
    ///
    /// A zero period panics inside the ticker task; `shutdown` reports it.
    pub fn with_period(period: Duration) -> Self {
        let (tx, rx) = async_channel::bounded(1);

        let ticker = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                match tx.try_send(()) {
                    // Full: last permit not taken yet, this tick is dropped
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => break,
                }
            }
        });

        debug!(?period, "rate limiter started");
        Self { permits: rx, ticker }
    }

    pub fn permits(&self) -> Permits {
        Permits {
            rx: self.permits.clone(),
        }
    }

    /// Stops the ticker and closes the permit channel
    pub fn stop(&self) {
        self.ticker.abort();
        self.permits.close();
        debug!("rate limiter stopped");
    }

    /// Stops the limiter and reports whether the ticker crashed before that
    ///
    /// The ticker only ends on its own by panicking: the limiter keeps a
    /// receiver open, so the channel cannot close under it.
    pub async fn shutdown(&mut self) -> Result<(), JoinError> {
        self.stop();
        match (&mut self.ticker).await {
            // Aborted by stop() while still ticking
            Err(e) if e.is_cancelled() => Ok(()),
            other => other,
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.ticker.abort();
        self.permits.close();
    }
}

impl Permits {
    /// Waits for one tick
    ///
    /// Returns false once the limiter is stopped and no permit is left.
    pub async fn acquire(&self) -> bool {
        self.rx.recv().await.is_ok()
    }
}

fn tick_period(rate_per_second: u32) -> Duration {
    // rate 0 is rejected by ScanConfig::validate, max(1) keeps this total
    Duration::from_secs(1) / rate_per_second.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[test]
    fn test_tick_period() {
        assert_eq!(tick_period(1), Duration::from_secs(1));
        assert_eq!(tick_period(10), Duration::from_millis(100));
        assert_eq!(tick_period(4), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_permit_is_immediate() {
        let limiter = RateLimiter::start(1);
        let permits = limiter.permits();

        let started = Instant::now();
        assert!(permits.acquire().await);
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permits_follow_the_period() {
        let limiter = RateLimiter::start(4);
        let permits = limiter.permits();

        let started = Instant::now();
        for _ in 0..5 {
            assert!(permits.acquire().await);
        }
        // Ticks at 0, 250, 500, 750, 1000 ms
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_is_shared_across_consumers() {
        let limiter = RateLimiter::start(10);
        let granted = Arc::new(AtomicUsize::new(0));

        let mut consumers = Vec::new();
        for _ in 0..8 {
            let permits = limiter.permits();
            let granted = granted.clone();
            consumers.push(tokio::spawn(async move {
                while permits.acquire().await {
                    granted.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        time::sleep(Duration::from_millis(950)).await;
        // Ticks at 0, 100, ..., 900 ms: ten permits in total, not ten each
        assert_eq!(granted.load(Ordering::SeqCst), 10);

        limiter.stop();
        for consumer in consumers {
            consumer.await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unclaimed_ticks_do_not_accumulate() {
        let limiter = RateLimiter::start(10);
        let permits = limiter.permits();

        // Nobody reads for a full second: at most one permit is waiting
        time::sleep(Duration::from_millis(1050)).await;
        assert!(permits.acquire().await);

        // The next one has to wait for the tick at 1100 ms
        let started = Instant::now();
        assert!(permits.acquire().await);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_acquire() {
        let limiter = RateLimiter::start(10);
        let permits = limiter.permits();
        assert!(permits.acquire().await);

        limiter.stop();

        // A permit already in the slot may still be handed out, then nothing
        let mut extra = 0;
        while permits.acquire().await {
            extra += 1;
        }
        assert!(extra <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_of_healthy_limiter_is_ok() {
        let mut limiter = RateLimiter::start(10);
        assert!(limiter.permits().acquire().await);
        assert!(limiter.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_reports_crashed_ticker() {
        let mut limiter = RateLimiter::with_period(Duration::ZERO);
        let permits = limiter.permits();

        // The ticker panics before sending anything, so no permit arrives
        assert!(!permits.acquire().await);

        let err = limiter.shutdown().await.unwrap_err();
        assert!(err.is_panic());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticker() {
        let limiter = RateLimiter::start(10);
        let permits = limiter.permits();
        drop(limiter);

        let mut extra = 0;
        while permits.acquire().await {
            extra += 1;
        }
        assert!(extra <= 1);
    }
}
