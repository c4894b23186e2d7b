// src/engine/jobs.rs
// =============================================================================
// The job source: turns the wordlist into target URLs and feeds the queue.
//
// The queue is bounded, so `send().await` suspends us whenever the workers
// are busy. We never get more than `capacity` targets ahead of them, no
// matter how long the wordlist is.
// =============================================================================

use async_channel::Sender;
use tracing::{debug, trace};

/// The token replaced by every word of the wordlist
pub const PLACEHOLDER: &str = "FUZZ";

/// Replaces every occurrence of the placeholder with `word`
///
/// A template without the placeholder comes back unchanged.
pub fn build_target(template: &str, word: &str) -> String {
    template.replace(PLACEHOLDER, word)
}

// Publishes one target per word, in wordlist order, then closes the queue
//
// Closing only stops new sends; targets already queued are still handed
// out, and workers see the end of the queue once it is drained.
pub async fn feed(template: String, words: Vec<String>, queue: Sender<String>) {
    let total = words.len();
    let mut sent = 0;

    for word in &words {
        let target = build_target(&template, word);
        trace!(%target, "queueing target");

        // Err means every worker is gone, nobody can take the rest
        if queue.send(target).await.is_err() {
            break;
        }
        sent += 1;
    }

    queue.close();
    debug!(sent, total, "job queue closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_target_replaces_placeholder() {
        assert_eq!(
            build_target("http://x.test/FUZZ", "admin"),
            "http://x.test/admin"
        );
    }

    #[test]
    fn test_build_target_replaces_every_occurrence() {
        assert_eq!(
            build_target("http://FUZZ.x.test/FUZZ.php?q=FUZZ", "api"),
            "http://api.x.test/api.php?q=api"
        );
    }

    #[test]
    fn test_build_target_without_placeholder_is_literal() {
        assert_eq!(build_target("http://x.test/", "admin"), "http://x.test/");
    }

    #[test]
    fn test_build_target_is_case_sensitive() {
        assert_eq!(build_target("http://x.test/fuzz", "admin"), "http://x.test/fuzz");
    }

    #[tokio::test]
    async fn test_feed_preserves_order_and_duplicates() {
        let words: Vec<String> = ["a", "b", "a", "c"].iter().map(|w| w.to_string()).collect();
        let (tx, rx) = async_channel::bounded(16);

        feed("http://x.test/FUZZ".to_string(), words, tx).await;

        let mut targets = Vec::new();
        while let Ok(target) = rx.recv().await {
            targets.push(target);
        }
        assert_eq!(
            targets,
            vec![
                "http://x.test/a",
                "http://x.test/b",
                "http://x.test/a",
                "http://x.test/c",
            ]
        );
    }

    #[tokio::test]
    async fn test_feed_empty_wordlist_closes_immediately() {
        let (tx, rx) = async_channel::bounded::<String>(4);

        feed("http://x.test/FUZZ".to_string(), Vec::new(), tx).await;

        assert!(rx.is_closed());
        assert!(rx.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_feed_blocks_when_queue_is_full() {
        let words: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let (tx, rx) = async_channel::bounded(2);

        let producer = tokio::spawn(feed("http://x.test/FUZZ".to_string(), words, tx));

        // Give the producer every chance to run ahead
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(rx.len(), 2);
        assert!(!producer.is_finished());

        let mut received = 0;
        while rx.recv().await.is_ok() {
            received += 1;
        }
        producer.await.unwrap();
        assert_eq!(received, 5);
    }

    #[tokio::test]
    async fn test_feed_stops_when_consumers_are_gone() {
        let words: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let (tx, rx) = async_channel::bounded(1);
        drop(rx);

        // Must return instead of waiting forever on a full queue
        feed("http://x.test/FUZZ".to_string(), words, tx).await;
    }
}
