// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

/// Bearer credential from the accounts service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Artist entry as returned by search, lookup, and batch endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistObject {
    pub id: String,
    pub name: String,
    /// Free-text genre tags; frequently empty even for well-known artists.
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsPage {
    #[serde(default)]
    pub items: Vec<ArtistObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub artists: Option<ArtistsPage>,
}

/// Batch lookup envelope; unknown ids come back as explicit nulls.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsEnvelope {
    #[serde(default)]
    pub artists: Vec<Option<ArtistObject>>,
}

/// Minimal credited-artist reference on a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackObject {
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub tracks: Vec<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedArtistsResponse {
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
}
