// SPDX-License-Identifier: GPL-3.0-or-later

//! Input reader and append-only output store.
//!
//! The output file is the resume point: a run scans the artist column of
//! whatever is already on disk and skips those records, so an interrupted
//! run picks up where it stopped without rewriting anything.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chartgenre_domain::{ArtistRecord, EnrichedRow};
use tracing::debug;

use crate::csv;
use crate::{Result, StorageError};

pub const OUTPUT_HEADER: [&str; 12] = [
    "artist",
    "l1",
    "l2",
    "l3",
    "matched_name",
    "catalog_id",
    "genre_tags_raw",
    "genre_main",
    "inferred_from",
    "confidence",
    "last_chart_year",
    "matched_from",
];

/// Read artist input rows. Requires an `artist` column; `last_chart_year`
/// is optional. Blank artist cells are skipped.
pub fn read_input(path: &Path) -> Result<Vec<ArtistRecord>> {
    let text = fs::read_to_string(path)?;
    let mut rows = csv::parse(&text).into_iter();

    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let artist_idx = header
        .iter()
        .position(|c| c == "artist")
        .ok_or(StorageError::MissingColumn {
            column: "artist",
            path: path.to_path_buf(),
        })?;
    let year_idx = header.iter().position(|c| c == "last_chart_year");

    let mut records = Vec::new();
    for row in rows {
        let raw_name = row.get(artist_idx).cloned().unwrap_or_default();
        if raw_name.trim().is_empty() {
            continue;
        }
        let last_chart_year = year_idx
            .and_then(|i| row.get(i))
            .and_then(|v| v.trim().parse().ok());
        records.push(ArtistRecord {
            raw_name,
            last_chart_year,
        });
    }

    debug!(target: "storage", records = records.len(), path = %path.display(), "input loaded");
    Ok(records)
}

/// Append-only CSV output with a single header line.
#[derive(Debug, Clone)]
pub struct OutputStore {
    path: PathBuf,
}

impl OutputStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Artist keys already written, for resume. An absent file means a
    /// fresh run.
    pub fn existing_keys(&self) -> Result<HashSet<String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };
        let mut keys = HashSet::new();
        for (i, row) in csv::parse(&text).into_iter().enumerate() {
            if i == 0 {
                continue;
            }
            if let Some(artist) = row.first() {
                if !artist.is_empty() {
                    keys.insert(artist.clone());
                }
            }
        }
        Ok(keys)
    }

    /// Append rows, writing the header only when the file starts empty.
    pub fn append(&self, rows: &[EnrichedRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let mut out = String::new();
        if needs_header {
            out.push_str(&csv::encode_record(&OUTPUT_HEADER));
            out.push('\n');
        }
        for row in rows {
            out.push_str(&csv::encode_record(&row_fields(row)));
            out.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(out.as_bytes())?;

        debug!(target: "storage", rows = rows.len(), "output rows appended");
        Ok(rows.len())
    }
}

fn row_fields(row: &EnrichedRow) -> Vec<String> {
    vec![
        row.artist.clone(),
        row.l1.clone(),
        row.l2.clone(),
        row.l3.clone(),
        row.matched_name.clone().unwrap_or_default(),
        row.catalog_id.clone().unwrap_or_default(),
        row.genre_tags_raw.join(";"),
        row.genre_main
            .map(|g| g.as_str().to_string())
            .unwrap_or_default(),
        row.inferred_from.as_str().to_string(),
        format!("{:.2}", row.confidence),
        row.last_chart_year
            .map(|y| y.to_string())
            .unwrap_or_default(),
        row.matched_from
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
    ]
}
