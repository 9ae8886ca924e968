// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded retry policy with an injectable backoff strategy.
//!
//! Delays are computed, not hard-coded into the call sites, so tests run the
//! whole retry machinery with zero-duration policies and no real sleeping.

use std::time::Duration;

#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    Fixed(Duration),
    Exponential { base: Duration, cap: Duration },
}

impl BackoffStrategy {
    /// Delay before retry number `attempt` (1-based: the wait after the
    /// first failed attempt is `delay(1)`).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { base, cap } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                base.saturating_mul(factor).min(*cap)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per call, the first one included.
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
    /// Safety margin added on top of a provider retry-after hint.
    pub rate_limit_margin: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                base: Duration::from_millis(500),
                cap: Duration::from_secs(8),
            },
            rate_limit_margin: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Zero-delay policy, for deterministic tests.
    pub fn no_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::Fixed(Duration::ZERO),
            rate_limit_margin: Duration::ZERO,
        }
    }
}
