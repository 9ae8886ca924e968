// SPDX-License-Identifier: GPL-3.0-or-later

//! Flat-file persistence: CSV input/output with append-and-resume semantics
//! and the JSON-backed resolution cache.

use std::path::PathBuf;
use thiserror::Error;

pub mod cache;
pub mod csv;
pub mod store;

pub use cache::{CacheEntry, ResolutionCache};
pub use store::{read_input, OutputStore, OUTPUT_HEADER};

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing column {column:?} in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },
}
