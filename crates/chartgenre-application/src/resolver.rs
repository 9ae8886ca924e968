// SPDX-License-Identifier: GPL-3.0-or-later

//! Catalog resolution under the exact-match policy.
//!
//! Key tiers are tried tightest-first; the first tier whose search returns a
//! candidate with an exactly matching display name (case-insensitive,
//! trimmed) wins and later tiers are never tried. Every lookup consults the
//! injected resolution cache before touching the network, so a key shared
//! across tiers or records costs one external search per run at most.

use chartgenre_domain::{CatalogIdentity, KeyTier};
use chartgenre_spotify::SpotifyError;
use chartgenre_storage::{CacheEntry, ResolutionCache};
use tracing::{debug, warn};

use crate::catalog::ArtistCatalog;

pub struct ArtistResolver<'a, C: ArtistCatalog> {
    catalog: &'a C,
    search_limit: u32,
}

fn canonical(s: &str) -> String {
    s.trim().to_lowercase()
}

impl<'a, C: ArtistCatalog> ArtistResolver<'a, C> {
    pub fn new(catalog: &'a C, search_limit: u32) -> Self {
        Self {
            catalog,
            search_limit,
        }
    }

    /// Resolve one artist's key tiers to a catalog identity, or `None` when
    /// no tier produces an exact match.
    ///
    /// Rate-limit exhaustion is the only error surfaced; any other catalog
    /// failure counts as "no match for this query" and resolution moves on
    /// to the next tier.
    pub async fn resolve(
        &self,
        keys: &KeyTier,
        cache: &mut ResolutionCache,
    ) -> Result<Option<CatalogIdentity>, SpotifyError> {
        for (tier, key) in keys.iter() {
            let query = canonical(key);
            if query.is_empty() {
                continue;
            }

            if let Some(entry) = cache.get(&query) {
                match entry {
                    CacheEntry::Hit { id, name } => {
                        debug!(target: "resolver", %query, %tier, "cache hit");
                        return Ok(Some(CatalogIdentity {
                            catalog_id: id.clone(),
                            display_name: name.clone(),
                            matched_from: tier,
                            matched_query: query,
                        }));
                    }
                    CacheEntry::Miss => continue,
                }
            }

            let candidates = match self.catalog.search_artists(&query, self.search_limit).await {
                Ok(candidates) => candidates,
                // An authoritative empty result, not a failure.
                Err(SpotifyError::NotFound(_)) => Vec::new(),
                Err(error) if error.halts_pipeline() => return Err(error),
                Err(error) => {
                    // Transient failure: not authoritative, so not cached.
                    warn!(target: "resolver", %query, %error, "search failed, trying next tier");
                    continue;
                }
            };

            match candidates
                .into_iter()
                .find(|candidate| canonical(&candidate.name) == query)
            {
                Some(exact) => {
                    cache.put(
                        &query,
                        CacheEntry::Hit {
                            id: exact.id.clone(),
                            name: exact.name.clone(),
                        },
                    );
                    debug!(target: "resolver", %query, %tier, id = %exact.id, "exact match");
                    return Ok(Some(CatalogIdentity {
                        catalog_id: exact.id,
                        display_name: exact.name,
                        matched_from: tier,
                        matched_query: query,
                    }));
                }
                None => {
                    cache.put(&query, CacheEntry::Miss);
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{artist, FakeCatalog};
    use chartgenre_domain::{normalize, Tier};

    #[tokio::test]
    async fn first_matching_tier_wins_and_later_tiers_are_not_tried() {
        let mut catalog = FakeCatalog::default();
        // Raw yields candidates but none exact; l1 matches exactly; l3 would
        // too, but must never be queried.
        catalog.search_results.insert(
            "the weeknd feat. daft punk".into(),
            vec![artist("wk", "The Weeknd", &[])],
        );
        catalog
            .search_results
            .insert("the weeknd".into(), vec![artist("wk", "The Weeknd", &[])]);

        let keys = normalize("The Weeknd feat. Daft Punk");
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        let identity = resolver.resolve(&keys, &mut cache).await.unwrap().unwrap();
        assert_eq!(identity.catalog_id, "wk");
        assert_eq!(identity.matched_from, Tier::L1);
        assert_eq!(identity.matched_query, "the weeknd");

        let calls = catalog.calls.lock().unwrap();
        assert_eq!(
            calls.searches,
            vec!["the weeknd feat. daft punk".to_string(), "the weeknd".to_string()]
        );
    }

    #[tokio::test]
    async fn raw_tier_resolves_when_full_credit_exists() {
        let mut catalog = FakeCatalog::default();
        catalog.search_results.insert(
            "the weeknd feat. daft punk".into(),
            vec![artist("duo", "The Weeknd feat. Daft Punk", &[])],
        );

        let keys = normalize("The Weeknd feat. Daft Punk");
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        let identity = resolver.resolve(&keys, &mut cache).await.unwrap().unwrap();
        assert_eq!(identity.matched_from, Tier::Raw);
        assert_eq!(identity.catalog_id, "duo");
    }

    #[tokio::test]
    async fn near_matches_do_not_count() {
        let mut catalog = FakeCatalog::default();
        catalog.search_results.insert(
            "cher".into(),
            vec![
                artist("x1", "Cher Lloyd", &[]),
                artist("x2", "Chérie", &[]),
            ],
        );

        let keys = normalize("Cher");
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        assert!(resolver.resolve(&keys, &mut cache).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exact_match_is_case_insensitive_and_trimmed() {
        let mut catalog = FakeCatalog::default();
        catalog
            .search_results
            .insert("cher".into(), vec![artist("ch", " CHER ", &[])]);

        let keys = normalize("Cher");
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        let identity = resolver.resolve(&keys, &mut cache).await.unwrap().unwrap();
        assert_eq!(identity.catalog_id, "ch");
        assert_eq!(identity.display_name, " CHER ");
    }

    #[tokio::test]
    async fn repeated_keys_cost_one_search_per_run() {
        let mut catalog = FakeCatalog::default();
        catalog
            .search_results
            .insert("cher".into(), vec![artist("ch", "Cher", &[])]);

        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        // Same lead artist under two different credits: the shared l1 key
        // must be searched only once.
        let first = normalize("Cher");
        let second = normalize("Cher feat. Nobody");

        let a = resolver.resolve(&first, &mut cache).await.unwrap().unwrap();
        assert_eq!(a.matched_from, Tier::Raw);

        let b = resolver.resolve(&second, &mut cache).await.unwrap().unwrap();
        assert_eq!(b.matched_from, Tier::L1);
        assert_eq!(b.catalog_id, "ch");

        let calls = catalog.calls.lock().unwrap();
        let cher_searches = calls.searches.iter().filter(|q| *q == "cher").count();
        assert_eq!(cher_searches, 1);
    }

    #[tokio::test]
    async fn cached_misses_short_circuit_without_network() {
        let catalog = FakeCatalog::default();
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        let keys = normalize("Unknown Artist");
        assert!(resolver.resolve(&keys, &mut cache).await.unwrap().is_none());
        let first_round = catalog.calls.lock().unwrap().searches.len();

        assert!(resolver.resolve(&keys, &mut cache).await.unwrap().is_none());
        let second_round = catalog.calls.lock().unwrap().searches.len();

        assert_eq!(first_round, second_round, "second resolve hit the network");
    }

    #[tokio::test]
    async fn empty_keys_are_never_queried() {
        let catalog = FakeCatalog::default();
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        // l2/l3 collapse to empty for a leading joiner token.
        let keys = normalize("X Ambassadors");
        assert_eq!(keys.l2, "");
        resolver.resolve(&keys, &mut cache).await.unwrap();

        let calls = catalog.calls.lock().unwrap();
        assert!(calls.searches.iter().all(|q| !q.is_empty()));
    }

    #[tokio::test]
    async fn transient_search_failure_falls_through_and_is_not_cached() {
        let mut catalog = FakeCatalog::default();
        catalog.failing_searches.insert("cher".into());
        catalog
            .search_results
            .insert("cher".into(), vec![artist("ch", "Cher", &[])]);

        let keys = normalize("Cher");
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        // All tiers share the key and the search keeps failing: no match,
        // but also no cached miss.
        assert!(resolver.resolve(&keys, &mut cache).await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_exhaustion_propagates() {
        let mut catalog = FakeCatalog::default();
        catalog.rate_limit_after_searches = Some(0);

        let keys = normalize("Cher");
        let mut cache = ResolutionCache::in_memory();
        let resolver = ArtistResolver::new(&catalog, 50);

        let error = resolver.resolve(&keys, &mut cache).await.unwrap_err();
        assert!(error.halts_pipeline());
    }
}
