// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration, Instant};

/// Politeness rate limiter for catalog API calls.
///
/// The Web API publishes no fixed request quota, so a minimum spacing between
/// requests keeps a long enrichment run well under the rolling rate window.
/// Hard 429 responses are still handled separately by the retry loop.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    min_interval: Duration,
    last_request: Arc<tokio::sync::Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified minimum interval between requests.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            min_interval,
            last_request: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Default spacing for a bulk enrichment run (5 requests per second).
    pub fn polite_default() -> Self {
        Self::new(Duration::from_millis(200))
    }

    /// Wait until a request can be made according to the rate limit.
    pub async fn acquire(&self) {
        let _permit = self.semaphore.acquire().await.expect("semaphore closed");

        let mut last = self.last_request.lock().await;

        if let Some(last_instant) = *last {
            let elapsed = last_instant.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::trace!(
                    target: "spotify",
                    "rate limiting: waiting {:?}",
                    wait_time
                );
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
