// SPDX-License-Identifier: GPL-3.0-or-later

use async_trait::async_trait;
use chartgenre_spotify::{ArtistObject, Result, SpotifyClient, TrackObject};

/// The catalog operations the resolver and inference engine consume.
///
/// The concrete HTTP client implements this; tests substitute in-memory
/// fakes with programmed responses.
#[async_trait]
pub trait ArtistCatalog: Send + Sync {
    /// Name search; no exactness guarantee, callers enforce their own policy.
    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<ArtistObject>>;

    /// Direct tag fetch for one artist; may be empty.
    async fn artist_genres(&self, id: &str) -> Result<Vec<String>>;

    /// Catalog-neighboring artists, tags included.
    async fn related_artists(&self, id: &str) -> Result<Vec<ArtistObject>>;

    /// Top-performing tracks with full credit lists.
    async fn top_tracks(&self, id: &str) -> Result<Vec<TrackObject>>;

    /// Recommended tracks seeded from one artist.
    async fn recommendations(&self, seed_id: &str, limit: u32) -> Result<Vec<TrackObject>>;

    /// Batched tag fetch; the implementation chunks at the provider cap.
    async fn artists_batch(&self, ids: &[String]) -> Result<Vec<ArtistObject>>;
}

#[async_trait]
impl ArtistCatalog for SpotifyClient {
    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<ArtistObject>> {
        SpotifyClient::search_artists(self, query, limit).await
    }

    async fn artist_genres(&self, id: &str) -> Result<Vec<String>> {
        SpotifyClient::artist_genres(self, id).await
    }

    async fn related_artists(&self, id: &str) -> Result<Vec<ArtistObject>> {
        SpotifyClient::related_artists(self, id).await
    }

    async fn top_tracks(&self, id: &str) -> Result<Vec<TrackObject>> {
        SpotifyClient::top_tracks(self, id).await
    }

    async fn recommendations(&self, seed_id: &str, limit: u32) -> Result<Vec<TrackObject>> {
        SpotifyClient::recommendations(self, seed_id, limit).await
    }

    async fn artists_batch(&self, ids: &[String]) -> Result<Vec<ArtistObject>> {
        SpotifyClient::artists_batch(self, ids).await
    }
}
