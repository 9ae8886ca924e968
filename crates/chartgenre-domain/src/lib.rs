// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};

pub mod buckets;
pub mod normalize;

pub use buckets::{classify, decide, Bucket, Decision, GenreLabel};
pub use normalize::{normalize, primary_artist};

// ============================================================================
// Value Objects
// ============================================================================

/// One row of input: a chart-credited artist string and the last year it
/// appeared on a chart. Read-only source fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub raw_name: String,
    pub last_chart_year: Option<i32>,
}

impl ArtistRecord {
    pub fn new(raw_name: impl Into<String>, last_chart_year: Option<i32>) -> Self {
        Self {
            raw_name: raw_name.into(),
            last_chart_year,
        }
    }
}

/// The four progressively looser lookup keys derived from one credit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Raw,
    L1,
    L2,
    L3,
}

impl Tier {
    /// Lookup order: tighter keys are always tried before looser ones.
    pub const ORDER: [Tier; 4] = [Tier::Raw, Tier::L1, Tier::L2, Tier::L3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Raw => "raw",
            Tier::L1 => "l1",
            Tier::L2 => "l2",
            Tier::L3 => "l3",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered key tiers for one artist. Each tier is derived only from its
/// predecessor, so `l3` is never longer than `l2`, and so on. Keys may be
/// empty when stripping consumes the whole string; empty keys are never
/// queried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTier {
    pub raw: String,
    pub l1: String,
    pub l2: String,
    pub l3: String,
}

impl KeyTier {
    pub fn get(&self, tier: Tier) -> &str {
        match tier {
            Tier::Raw => &self.raw,
            Tier::L1 => &self.l1,
            Tier::L2 => &self.l2,
            Tier::L3 => &self.l3,
        }
    }

    /// Keys in lookup order, paired with their tier.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &str)> + '_ {
        Tier::ORDER.into_iter().map(move |t| (t, self.get(t)))
    }

    pub fn is_empty(&self) -> bool {
        Tier::ORDER.iter().all(|t| self.get(*t).is_empty())
    }
}

/// A successful exact-match resolution against the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIdentity {
    pub catalog_id: String,
    pub display_name: String,
    /// Which key tier produced the match.
    pub matched_from: Tier,
    /// The query string that matched, already lowercased and trimmed.
    pub matched_query: String,
}

/// Which inference tier produced the genre decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreSource {
    Direct,
    Related,
    TopTracks,
    Recs,
    None,
}

impl GenreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenreSource::Direct => "direct",
            GenreSource::Related => "related",
            GenreSource::TopTracks => "top_tracks",
            GenreSource::Recs => "recs",
            GenreSource::None => "none",
        }
    }
}

impl std::fmt::Display for GenreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of genre inference for one resolved (or unresolved) artist.
///
/// `genre_main = None` means no bucket could be decided at all, which is
/// distinct from `Some(GenreLabel::Other)`: tags existed but matched no
/// bucket keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub genre_main: Option<GenreLabel>,
    pub confidence: f32,
    pub source: GenreSource,
    pub raw_tags: Vec<String>,
}

impl InferenceResult {
    /// The give-up result: no tags, no bucket, zero confidence.
    pub fn none() -> Self {
        Self {
            genre_main: None,
            confidence: 0.0,
            source: GenreSource::None,
            raw_tags: Vec::new(),
        }
    }
}

/// One fully enriched output row, serialized as flat tabular data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub artist: String,
    pub l1: String,
    pub l2: String,
    pub l3: String,
    pub matched_name: Option<String>,
    pub catalog_id: Option<String>,
    pub genre_tags_raw: Vec<String>,
    pub genre_main: Option<GenreLabel>,
    pub inferred_from: GenreSource,
    pub confidence: f32,
    pub last_chart_year: Option<i32>,
    pub matched_from: Option<Tier>,
}

impl EnrichedRow {
    pub fn from_parts(
        record: &ArtistRecord,
        keys: &KeyTier,
        identity: Option<&CatalogIdentity>,
        inference: &InferenceResult,
    ) -> Self {
        Self {
            artist: keys.raw.clone(),
            l1: keys.l1.clone(),
            l2: keys.l2.clone(),
            l3: keys.l3.clone(),
            matched_name: identity.map(|i| i.display_name.clone()),
            catalog_id: identity.map(|i| i.catalog_id.clone()),
            genre_tags_raw: inference.raw_tags.clone(),
            genre_main: inference.genre_main,
            inferred_from: inference.source,
            confidence: inference.confidence,
            last_chart_year: record.last_chart_year,
            matched_from: identity.map(|i| i.matched_from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_order_is_tightest_first() {
        assert_eq!(Tier::ORDER[0], Tier::Raw);
        assert_eq!(Tier::ORDER[3], Tier::L3);
        assert_eq!(Tier::L2.as_str(), "l2");
    }

    #[test]
    fn key_tier_iterates_in_lookup_order() {
        let keys = KeyTier {
            raw: "a".into(),
            l1: "b".into(),
            l2: "c".into(),
            l3: "d".into(),
        };
        let collected: Vec<_> = keys.iter().map(|(t, k)| (t, k.to_string())).collect();
        assert_eq!(
            collected,
            vec![
                (Tier::Raw, "a".to_string()),
                (Tier::L1, "b".to_string()),
                (Tier::L2, "c".to_string()),
                (Tier::L3, "d".to_string()),
            ]
        );
    }

    #[test]
    fn none_result_has_zero_confidence() {
        let result = InferenceResult::none();
        assert_eq!(result.genre_main, None);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.source, GenreSource::None);
        assert!(result.raw_tags.is_empty());
    }

    #[test]
    fn enriched_row_from_unresolved_record() {
        let record = ArtistRecord::new("Ghost Artist", Some(1999));
        let keys = normalize(&record.raw_name);
        let row = EnrichedRow::from_parts(&record, &keys, None, &InferenceResult::none());
        assert_eq!(row.artist, "ghost artist");
        assert_eq!(row.matched_name, None);
        assert_eq!(row.catalog_id, None);
        assert_eq!(row.matched_from, None);
        assert_eq!(row.inferred_from, GenreSource::None);
        assert_eq!(row.last_chart_year, Some(1999));
    }
}
