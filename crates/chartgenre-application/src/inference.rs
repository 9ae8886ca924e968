// SPDX-License-Identifier: GPL-3.0-or-later

//! Tiered genre inference.
//!
//! A resolved identity is pushed through an ordered fallback until one tier
//! produces a decision:
//!
//! 1. the artist's own tags (confidence 1.0)
//! 2. related artists' aggregated tags (capped 0.8)
//! 3. co-credited artists from top tracks (capped 0.7, full mode only)
//! 4. recommendation-seeded artists (capped 0.6, full mode only)
//!
//! Aggregating tiers share a dominance rule: enough distinct tags, and a
//! clear winner over the runner-up bucket. An undecided tier falls through;
//! when everything falls through the result is the explicit give-up row.

use std::collections::HashSet;

use chartgenre_domain::{buckets, CatalogIdentity, GenreLabel, GenreSource, InferenceResult};
use chartgenre_spotify::{SpotifyError, TrackObject};
use tracing::{debug, warn};

use crate::catalog::ArtistCatalog;

/// Serialized direct tags keep only the leading entries.
const DIRECT_TAG_LIMIT: usize = 5;

const RELATED_CONFIDENCE_CAP: f32 = 0.8;
const TOP_TRACKS_CONFIDENCE_CAP: f32 = 0.7;
const RECS_CONFIDENCE_CAP: f32 = 0.6;

#[derive(Debug, Clone)]
pub struct InferenceOptions {
    /// Skip the collaborator and recommendation tiers.
    pub fast_mode: bool,
    pub min_tag_count: usize,
    pub dominance_ratio: f32,
    pub collaborator_cap: usize,
    pub recommendation_cap: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            fast_mode: true,
            min_tag_count: 6,
            dominance_ratio: 2.0,
            collaborator_cap: 20,
            recommendation_cap: 50,
        }
    }
}

pub struct GenreInference<'a, C: ArtistCatalog> {
    catalog: &'a C,
    options: InferenceOptions,
}

impl<'a, C: ArtistCatalog> GenreInference<'a, C> {
    pub fn new(catalog: &'a C, options: InferenceOptions) -> Self {
        Self { catalog, options }
    }

    /// Infer one genre label for a resolved identity.
    ///
    /// Rate-limit exhaustion is the only error surfaced; any other catalog
    /// failure empties the tier it hit and inference falls through.
    pub async fn infer(&self, identity: &CatalogIdentity) -> Result<InferenceResult, SpotifyError> {
        let id = identity.catalog_id.as_str();

        if let Some(tags) = self.degrade(self.catalog.artist_genres(id).await)? {
            if !tags.is_empty() {
                let genre_main = buckets::classify(&tags);
                return Ok(InferenceResult {
                    genre_main,
                    confidence: 1.0,
                    source: GenreSource::Direct,
                    raw_tags: tags.into_iter().take(DIRECT_TAG_LIMIT).collect(),
                });
            }
        }
        debug!(target: "inference", artist = %identity.display_name, "no direct tags, widening");

        if let Some(related) = self.degrade(self.catalog.related_artists(id).await)? {
            let tags = union_tags(related.iter().map(|a| &a.genres));
            if let Some(result) = self.decide(tags, GenreSource::Related, RELATED_CONFIDENCE_CAP) {
                return Ok(result);
            }
        }

        if self.options.fast_mode {
            return Ok(InferenceResult::none());
        }

        if let Some(tracks) = self.degrade(self.catalog.top_tracks(id).await)? {
            let collaborators = credited_ids(&tracks, id, self.options.collaborator_cap);
            if let Some(result) = self
                .aggregate_over(&collaborators, GenreSource::TopTracks, TOP_TRACKS_CONFIDENCE_CAP)
                .await?
            {
                return Ok(result);
            }
        }

        let recommendations = self
            .catalog
            .recommendations(id, self.options.recommendation_cap as u32)
            .await;
        if let Some(tracks) = self.degrade(recommendations)? {
            let seeds = credited_ids(&tracks, id, self.options.recommendation_cap);
            if let Some(result) = self
                .aggregate_over(&seeds, GenreSource::Recs, RECS_CONFIDENCE_CAP)
                .await?
            {
                return Ok(result);
            }
        }

        Ok(InferenceResult::none())
    }

    /// Batch-fetch a set of neighbor ids and run the dominance rule over
    /// their unioned tags.
    async fn aggregate_over(
        &self,
        ids: &[String],
        source: GenreSource,
        cap: f32,
    ) -> Result<Option<InferenceResult>, SpotifyError> {
        if ids.is_empty() {
            return Ok(None);
        }
        let Some(artists) = self.degrade(self.catalog.artists_batch(ids).await)? else {
            return Ok(None);
        };
        let tags = union_tags(artists.iter().map(|a| &a.genres));
        Ok(self.decide(tags, source, cap))
    }

    fn decide(&self, tags: Vec<String>, source: GenreSource, cap: f32) -> Option<InferenceResult> {
        let decision = buckets::decide(&tags, self.options.min_tag_count, self.options.dominance_ratio)?;
        debug!(
            target: "inference",
            bucket = %decision.bucket,
            %source,
            tags = tags.len(),
            "aggregated tier decided"
        );
        Some(InferenceResult {
            genre_main: Some(GenreLabel::Bucket(decision.bucket)),
            confidence: decision.strength.min(cap),
            source,
            raw_tags: tags,
        })
    }

    /// Transport-class failures empty the tier they hit; only rate-limit
    /// exhaustion propagates.
    fn degrade<T>(&self, result: Result<T, SpotifyError>) -> Result<Option<T>, SpotifyError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(SpotifyError::NotFound(_)) => Ok(None),
            Err(error) if error.halts_pipeline() => Err(error),
            Err(error) => {
                warn!(target: "inference", %error, "catalog call failed, tier skipped");
                Ok(None)
            }
        }
    }
}

/// Union of tag sets, first-seen order, case-insensitive dedup, blanks
/// dropped.
fn union_tags<'t>(sets: impl Iterator<Item = &'t Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for set in sets {
        for tag in set {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.to_lowercase()) {
                tags.push(trimmed.to_string());
            }
        }
    }
    tags
}

/// Distinct co-credited ids across tracks, excluding the artist itself,
/// bounded by `cap`.
fn credited_ids(tracks: &[TrackObject], own_id: &str, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for track in tracks {
        for credit in &track.artists {
            if credit.id.is_empty() || credit.id == own_id {
                continue;
            }
            if seen.insert(credit.id.clone()) {
                ids.push(credit.id.clone());
                if ids.len() == cap {
                    return ids;
                }
            }
        }
    }
    ids
}
