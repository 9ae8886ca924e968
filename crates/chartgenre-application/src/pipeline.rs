// SPDX-License-Identifier: GPL-3.0-or-later

//! Sequential enrichment pipeline.
//!
//! Rows are processed one at a time, normalize → resolve → infer, so the
//! resolution cache always observes every earlier lookup. Output rows keep
//! input order, already-written rows are skipped on resume, and the buffer
//! is flushed every `flush_every` rows. Rate-limit exhaustion is a designed
//! early exit: flush whatever is buffered, persist the cache, and stop the
//! whole run rather than the current record only.

use chartgenre_domain::{normalize, ArtistRecord, EnrichedRow, InferenceResult};
use chartgenre_storage::{OutputStore, ResolutionCache, StorageError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::ArtistCatalog;
use crate::inference::{GenreInference, InferenceOptions};
use crate::resolver::ArtistResolver;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub flush_every: usize,
    pub search_limit: u32,
    pub inference: InferenceOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            flush_every: 20,
            search_limit: 50,
            inference: InferenceOptions::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub processed: usize,
    pub skipped: usize,
    pub resolved: usize,
    pub written: usize,
    pub halted_rate_limited: bool,
}

/// Run the enrichment over `records`, appending to `store`.
pub async fn run<C: ArtistCatalog>(
    catalog: &C,
    records: &[ArtistRecord],
    store: &OutputStore,
    cache: &mut ResolutionCache,
    options: &PipelineOptions,
) -> Result<PipelineSummary, PipelineError> {
    let resolver = ArtistResolver::new(catalog, options.search_limit);
    let inference = GenreInference::new(catalog, options.inference.clone());

    let existing = store.existing_keys()?;
    if !existing.is_empty() {
        info!(target: "pipeline", done = existing.len(), "resuming over existing output");
    }

    let mut summary = PipelineSummary::default();
    let mut buffer: Vec<EnrichedRow> = Vec::new();

    for record in records {
        let keys = normalize(&record.raw_name);
        if existing.contains(&keys.raw) {
            summary.skipped += 1;
            continue;
        }

        let identity = match resolver.resolve(&keys, cache).await {
            Ok(identity) => identity,
            Err(error) => {
                warn!(target: "pipeline", %error, artist = %keys.raw, "catalog unavailable, stopping run");
                summary.halted_rate_limited = true;
                break;
            }
        };

        let result = match &identity {
            Some(identity) => match inference.infer(identity).await {
                Ok(result) => result,
                Err(error) => {
                    warn!(target: "pipeline", %error, artist = %keys.raw, "catalog unavailable, stopping run");
                    summary.halted_rate_limited = true;
                    break;
                }
            },
            None => InferenceResult::none(),
        };

        if identity.is_some() {
            summary.resolved += 1;
        }
        buffer.push(EnrichedRow::from_parts(record, &keys, identity.as_ref(), &result));
        summary.processed += 1;

        if buffer.len() >= options.flush_every {
            summary.written += store.append(&buffer)?;
            buffer.clear();
            if let Err(error) = cache.persist() {
                warn!(target: "pipeline", %error, "resolution cache persist failed");
            }
            debug!(target: "pipeline", written = summary.written, "flushed output buffer");
        }
    }

    summary.written += store.append(&buffer)?;
    cache.persist()?;

    info!(
        target: "pipeline",
        processed = summary.processed,
        skipped = summary.skipped,
        resolved = summary.resolved,
        written = summary.written,
        halted = summary.halted_rate_limited,
        "run complete"
    );
    Ok(summary)
}
