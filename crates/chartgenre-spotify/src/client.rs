// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, SpotifyError};
use crate::models::{
    ArtistObject, ArtistsEnvelope, RecommendationsResponse, RelatedArtistsResponse, SearchResponse,
    TokenResponse, TopTracksResponse, TrackObject,
};
use crate::rate_limiter::RateLimiter;
use crate::retry::RetryPolicy;
use moka::sync::Cache;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, trace, warn};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";

/// The batch artist endpoint accepts at most this many ids per call.
pub const BATCH_LIMIT: usize = 50;

/// Client-credentials pair for the accounts service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Spotify Web API client with rate limiting, bounded retries, and a
/// read-through per-artist tag cache.
#[derive(Clone, Debug)]
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    auth_url: String,
    credentials: Credentials,
    token: Arc<Mutex<Option<String>>>,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
    tag_cache: Cache<String, Vec<String>>,
}

impl SpotifyClient {
    /// Create a new client with default settings.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder(credentials: Credentials) -> SpotifyClientBuilder {
        SpotifyClientBuilder::new(credentials)
    }

    /// Obtain a fresh bearer credential via the client-credentials grant.
    ///
    /// Called lazily before the first request; callable again after expiry.
    pub async fn authenticate(&self) -> Result<()> {
        let token = self.fetch_token().await?;
        *self.token.lock().await = Some(token);
        Ok(())
    }

    /// Search for artists by name.
    ///
    /// The query is quoted so multi-word names stay a single term. No
    /// exactness is guaranteed by the provider; callers enforce their own
    /// match policy over the returned candidates.
    pub async fn search_artists(&self, name: &str, limit: u32) -> Result<Vec<ArtistObject>> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", &format!("artist:\"{}\"", name))
            .append_pair("type", "artist")
            .append_pair("limit", &limit.to_string());

        let response: SearchResponse = self.get_json(url.as_str()).await?;
        Ok(response.artists.map(|page| page.items).unwrap_or_default())
    }

    /// Look up a single artist by id.
    pub async fn get_artist(&self, id: &str) -> Result<ArtistObject> {
        let url = format!("{}/artists/{}", self.base_url, id);
        self.get_json(&url).await
    }

    /// Direct genre-tag fetch for one artist, served from the in-memory tag
    /// cache when the id has been seen before in this run.
    pub async fn artist_genres(&self, id: &str) -> Result<Vec<String>> {
        if let Some(cached) = self.tag_cache.get(id) {
            return Ok(cached);
        }
        let artist = self.get_artist(id).await?;
        self.tag_cache.insert(artist.id.clone(), artist.genres.clone());
        Ok(artist.genres)
    }

    /// Catalog-neighboring artists, each carrying its own tag set.
    pub async fn related_artists(&self, id: &str) -> Result<Vec<ArtistObject>> {
        let url = format!("{}/artists/{}/related-artists", self.base_url, id);
        let response: RelatedArtistsResponse = self.get_json(&url).await?;
        for artist in &response.artists {
            self.tag_cache.insert(artist.id.clone(), artist.genres.clone());
        }
        Ok(response.artists)
    }

    /// Top-performing tracks for an artist, with their full credit lists.
    pub async fn top_tracks(&self, id: &str) -> Result<Vec<TrackObject>> {
        let mut url = Url::parse(&format!("{}/artists/{}/top-tracks", self.base_url, id))
            .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut().append_pair("market", "US");

        let response: TopTracksResponse = self.get_json(url.as_str()).await?;
        Ok(response.tracks)
    }

    /// Recommended tracks seeded from one artist.
    pub async fn recommendations(&self, seed_id: &str, limit: u32) -> Result<Vec<TrackObject>> {
        let mut url = Url::parse(&format!("{}/recommendations", self.base_url))
            .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("seed_artists", seed_id)
            .append_pair("limit", &limit.to_string());

        let response: RecommendationsResponse = self.get_json(url.as_str()).await?;
        Ok(response.tracks)
    }

    /// Batched artist fetch, chunked at the provider's 50-id cap. Unknown
    /// ids are dropped from the result rather than surfaced as errors.
    pub async fn artists_batch(&self, ids: &[String]) -> Result<Vec<ArtistObject>> {
        let mut artists = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(BATCH_LIMIT) {
            let mut url = Url::parse(&format!("{}/artists", self.base_url))
                .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;
            url.query_pairs_mut().append_pair("ids", &chunk.join(","));

            let envelope: ArtistsEnvelope = self.get_json(url.as_str()).await?;
            for artist in envelope.artists.into_iter().flatten() {
                self.tag_cache.insert(artist.id.clone(), artist.genres.clone());
                artists.push(artist);
            }
        }
        Ok(artists)
    }

    async fn ensure_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }
        let token = self.fetch_token().await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<String> {
        debug!(target: "spotify", "requesting client-credentials token");

        let response = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SpotifyError::RateLimited {
                retry_after: retry_after_hint(&response),
            });
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SpotifyError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Rate-limited, retried GET with bearer auth and one transparent
    /// re-authentication on a rejected credential.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut reauthenticated = false;
        let mut attempt: u32 = 1;

        loop {
            self.rate_limiter.acquire().await;
            let token = self.ensure_token().await?;

            trace!(target: "spotify", "GET {}", url);

            let response = match self.http.get(url).bearer_auth(&token).send().await {
                Ok(response) => response,
                Err(error) => {
                    if attempt < self.retry.max_attempts {
                        let delay = self.retry.backoff.delay(attempt);
                        warn!(
                            target: "spotify",
                            %error,
                            attempt,
                            "transport failure, retrying in {:?}",
                            delay
                        );
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(SpotifyError::RequestFailed(error));
                }
            };

            let status = response.status();
            debug!(target: "spotify", %status, "response");

            if status == StatusCode::UNAUTHORIZED {
                if !reauthenticated {
                    debug!(target: "spotify", "credential rejected, re-authenticating");
                    self.token.lock().await.take();
                    reauthenticated = true;
                    continue;
                }
                return Err(SpotifyError::CredentialExpired);
            }

            if status == StatusCode::NOT_FOUND {
                return Err(SpotifyError::NotFound(url.to_string()));
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < self.retry.max_attempts {
                    let hinted = retry_after_hint(&response)
                        .unwrap_or_else(|| self.retry.backoff.delay(attempt));
                    let wait = hinted + self.retry.rate_limit_margin;
                    warn!(target: "spotify", attempt, "rate limited, waiting {:?}", wait);
                    sleep(wait).await;
                    attempt += 1;
                    continue;
                }
                return Err(SpotifyError::RateLimitExhausted);
            }

            if status.is_server_error() {
                if attempt < self.retry.max_attempts {
                    let delay = self.retry.backoff.delay(attempt);
                    warn!(
                        target: "spotify",
                        %status,
                        attempt,
                        "server error, retrying in {:?}",
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(SpotifyError::ApiError {
                    status: status.as_u16(),
                    message,
                });
            }

            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(SpotifyError::ApiError {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|e| {
                SpotifyError::InvalidResponse(format!("failed to parse response: {}", e))
            });
        }
    }
}

fn retry_after_hint(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Builder for configuring a Spotify client.
#[derive(Debug)]
pub struct SpotifyClientBuilder {
    credentials: Credentials,
    base_url: String,
    auth_url: String,
    timeout: Duration,
    rate_limit_interval: Duration,
    retry: RetryPolicy,
    tag_cache_capacity: u64,
}

impl SpotifyClientBuilder {
    fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: SPOTIFY_API_BASE.to_string(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            timeout: Duration::from_secs(20),
            rate_limit_interval: Duration::from_millis(200),
            retry: RetryPolicy::default(),
            tag_cache_capacity: 10_000,
        }
    }

    /// Set a custom API base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom token endpoint URL (useful for testing).
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set minimum spacing between requests.
    pub fn rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    /// Set the retry policy for transient failures and rate limiting.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Build the Spotify client.
    pub fn build(self) -> Result<SpotifyClient> {
        let http = Client::builder().timeout(self.timeout).build()?;

        Ok(SpotifyClient {
            http,
            base_url: self.base_url,
            auth_url: self.auth_url,
            credentials: self.credentials,
            token: Arc::new(Mutex::new(None)),
            rate_limiter: RateLimiter::new(self.rate_limit_interval),
            retry: self.retry,
            tag_cache: Cache::new(self.tag_cache_capacity),
        })
    }
}
