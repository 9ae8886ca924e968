// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory catalog fake with programmed responses and call recording.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chartgenre_spotify::{ArtistObject, ArtistRef, Result, SpotifyError, TrackObject};

use crate::catalog::ArtistCatalog;

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub searches: Vec<String>,
    pub genre_lookups: Vec<String>,
    pub related: Vec<String>,
    pub top_tracks: Vec<String>,
    pub recommendations: Vec<String>,
    pub batches: Vec<Vec<String>>,
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub search_results: HashMap<String, Vec<ArtistObject>>,
    pub genres: HashMap<String, Vec<String>>,
    pub related: HashMap<String, Vec<ArtistObject>>,
    pub top: HashMap<String, Vec<TrackObject>>,
    pub recs: HashMap<String, Vec<TrackObject>>,
    pub batch_artists: HashMap<String, ArtistObject>,
    /// Queries that fail with a server error.
    pub failing_searches: HashSet<String>,
    /// Ids whose related-artist lookup fails with a server error.
    pub failing_related: HashSet<String>,
    /// After this many searches, every further search is rate-limit
    /// exhausted.
    pub rate_limit_after_searches: Option<usize>,
    pub calls: Mutex<Calls>,
}

pub(crate) fn artist(id: &str, name: &str, genres: &[&str]) -> ArtistObject {
    ArtistObject {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub(crate) fn track(credits: &[(&str, &str)]) -> TrackObject {
    TrackObject {
        artists: credits
            .iter()
            .map(|(id, name)| ArtistRef {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
    }
}

fn server_error() -> SpotifyError {
    SpotifyError::ApiError {
        status: 500,
        message: "synthetic failure".to_string(),
    }
}

#[async_trait]
impl ArtistCatalog for FakeCatalog {
    async fn search_artists(&self, query: &str, _limit: u32) -> Result<Vec<ArtistObject>> {
        let mut calls = self.calls.lock().unwrap();
        if let Some(cap) = self.rate_limit_after_searches {
            if calls.searches.len() >= cap {
                return Err(SpotifyError::RateLimitExhausted);
            }
        }
        calls.searches.push(query.to_string());
        if self.failing_searches.contains(query) {
            return Err(server_error());
        }
        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn artist_genres(&self, id: &str) -> Result<Vec<String>> {
        self.calls.lock().unwrap().genre_lookups.push(id.to_string());
        Ok(self.genres.get(id).cloned().unwrap_or_default())
    }

    async fn related_artists(&self, id: &str) -> Result<Vec<ArtistObject>> {
        self.calls.lock().unwrap().related.push(id.to_string());
        if self.failing_related.contains(id) {
            return Err(server_error());
        }
        Ok(self.related.get(id).cloned().unwrap_or_default())
    }

    async fn top_tracks(&self, id: &str) -> Result<Vec<TrackObject>> {
        self.calls.lock().unwrap().top_tracks.push(id.to_string());
        Ok(self.top.get(id).cloned().unwrap_or_default())
    }

    async fn recommendations(&self, seed_id: &str, _limit: u32) -> Result<Vec<TrackObject>> {
        self.calls
            .lock()
            .unwrap()
            .recommendations
            .push(seed_id.to_string());
        Ok(self.recs.get(seed_id).cloned().unwrap_or_default())
    }

    async fn artists_batch(&self, ids: &[String]) -> Result<Vec<ArtistObject>> {
        self.calls.lock().unwrap().batches.push(ids.to_vec());
        Ok(ids
            .iter()
            .filter_map(|id| self.batch_artists.get(id).cloned())
            .collect())
    }
}
