// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolution cache: one entry per lowercase search key, recording either
//! the catalog id that matched exactly or an explicit miss. Entries are
//! write-once within a run and never invalidated; persisting the cache lets
//! a later run resume without repeating any search.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheEntry {
    Hit { id: String, name: String },
    Miss,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    saved_at: DateTime<Utc>,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    path: Option<PathBuf>,
    entries: HashMap<String, CacheEntry>,
    dirty: bool,
}

impl ResolutionCache {
    /// A cache with no backing file; `persist` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed cache, starting empty when the file is absent.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => {
                let file: CacheFile = serde_json::from_str(&text)?;
                debug!(
                    target: "storage",
                    entries = file.entries.len(),
                    path = %path.display(),
                    "resolution cache loaded"
                );
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path),
            entries,
            dirty: false,
        })
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Record an entry for a key. Write-once: the first entry wins and
    /// later puts for the same key are ignored.
    pub fn put(&mut self, key: impl Into<String>, entry: CacheEntry) {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return;
        }
        self.entries.insert(key, entry);
        self.dirty = true;
    }

    /// Write the cache to its backing file, if any and if changed.
    pub fn persist(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = CacheFile {
            saved_at: Utc::now(),
            entries: self.entries.clone(),
        };
        fs::write(path, serde_json::to_string_pretty(&file)?)?;
        self.dirty = false;
        debug!(
            target: "storage",
            entries = self.entries.len(),
            "resolution cache persisted"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let cache = ResolutionCache::load(dir.path().join("cache.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn persist_and_reload_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = ResolutionCache::load(&path).unwrap();
        cache.put(
            "the weeknd",
            CacheEntry::Hit {
                id: "1Xyo4u8uXC1ZmMpatF05PJ".into(),
                name: "The Weeknd".into(),
            },
        );
        cache.put("nobody known", CacheEntry::Miss);
        cache.persist().unwrap();

        let reloaded = ResolutionCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("nobody known"), Some(&CacheEntry::Miss));
        match reloaded.get("the weeknd") {
            Some(CacheEntry::Hit { name, .. }) => assert_eq!(name, "The Weeknd"),
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn entries_are_write_once() {
        let mut cache = ResolutionCache::in_memory();
        cache.put("cher", CacheEntry::Miss);
        cache.put(
            "cher",
            CacheEntry::Hit {
                id: "x".into(),
                name: "Cher".into(),
            },
        );
        assert_eq!(cache.get("cher"), Some(&CacheEntry::Miss));
    }

    #[test]
    fn in_memory_persist_is_noop() {
        let mut cache = ResolutionCache::in_memory();
        cache.put("a", CacheEntry::Miss);
        cache.persist().unwrap();
    }
}
