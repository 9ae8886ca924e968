// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify Web API client for artist search and genre metadata.
//!
//! Wraps the handful of catalog operations the enrichment pipeline needs:
//! client-credentials authentication, artist search by name, direct and
//! batched genre-tag lookup, related artists, top tracks, and
//! recommendations. Requests are paced by a politeness rate limiter and
//! retried under a bounded, injectable retry policy; an expired credential
//! is refreshed transparently exactly once per call.

pub mod client;
pub mod error;
pub mod models;
pub mod rate_limiter;
pub mod retry;

pub use client::{Credentials, SpotifyClient, SpotifyClientBuilder, BATCH_LIMIT};
pub use error::{Result, SpotifyError};
pub use models::{ArtistObject, ArtistRef, TrackObject};
pub use retry::{BackoffStrategy, RetryPolicy};
