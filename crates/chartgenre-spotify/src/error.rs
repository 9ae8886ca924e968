// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpotifyError>;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("rate limit retries exhausted")]
    RateLimitExhausted,

    #[error("credential expired and refresh did not help")]
    CredentialExpired,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("invalid response from catalog: {0}")]
    InvalidResponse(String),
}

impl SpotifyError {
    /// Only rate-limit exhaustion stops a whole run; every other failure
    /// degrades to an empty result for the call at hand.
    pub fn halts_pipeline(&self) -> bool {
        matches!(self, SpotifyError::RateLimitExhausted)
    }
}
