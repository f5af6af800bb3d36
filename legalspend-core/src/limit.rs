//! Sliding-window request throttling, keyed per logical identity.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Courtesy rate limiter enforcing at most `max_requests` acquisitions per
/// `window`, independently per key, so distinct credentials or sources never
/// share a budget.
///
/// The guarantee is a sliding window over acquisition timestamps, not a hard
/// SLA: concurrent callers on the same key can wake near-simultaneously and
/// briefly overshoot the limit by a small margin.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    buckets: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Suspend until an acquisition under `key` fits the sliding window, then
    /// record it. The wait is exactly the time needed for the oldest retained
    /// timestamp to exit the window, never negative.
    pub async fn acquire(&self, key: &str) {
        let wait = {
            let mut buckets = self.buckets.lock().await;
            let now = Instant::now();
            let bucket = buckets.entry(key.to_string()).or_default();
            Self::prune(bucket, now, self.window);

            if bucket.len() < self.max_requests {
                bucket.push_back(now);
                None
            } else {
                // Oldest retained timestamp leaves the window at front + window.
                bucket
                    .front()
                    .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
            }
        };

        if let Some(delay) = wait {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let mut buckets = self.buckets.lock().await;
            let now = Instant::now();
            let bucket = buckets.entry(key.to_string()).or_default();
            Self::prune(bucket, now, self.window);
            bucket.push_back(now);
        }
    }

    fn prune(bucket: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(front) = bucket.front() {
            if now.duration_since(*front) >= window {
                bucket.pop_front();
            } else {
                break;
            }
        }
    }
}
