//! Per-run sprite sheet cache.
//!
//! A [`SpriteStore`] maps a cache key (glob plus spacing) to a finished
//! [`ImageList`]. One store lives for one compilation run and is shared by
//! every function call made during that run.
//!
//! Builds run outside the lock. Two callers that miss on the same key at the
//! same time both build, and the last one to insert wins. Lists built for the
//! same key are interchangeable, so the only cost is duplicated work.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::error::Result;
use crate::render::{ImageList, ImageSource, RasterCodec};

/// Cache key for a sheet built from `glob` with `spacing`.
pub fn cache_key(glob: &str, spacing: i64) -> String {
    format!("{}{}", glob, spacing)
}

/// Concurrency-safe map of cache key to built sprite sheet.
pub struct SpriteStore<S: ImageSource = RasterCodec> {
    entries: RwLock<HashMap<String, Arc<ImageList<S>>>>,
}

impl<S: ImageSource> Default for SpriteStore<S> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<S: ImageSource> SpriteStore<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a cached sheet.
    pub fn get(&self, key: &str) -> Option<Arc<ImageList<S>>> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Return the sheet stored under `key`, building and inserting it on a miss.
    ///
    /// `build` runs without holding the lock. A failed build stores nothing.
    pub fn get_or_build<F>(&self, key: &str, build: F) -> Result<Arc<ImageList<S>>>
    where
        F: FnOnce() -> Result<ImageList<S>>,
    {
        if let Some(list) = self.get(key) {
            debug!("sprite cache hit: {}", key);
            return Ok(list);
        }

        let list = Arc::new(build()?);
        self.insert(key, Arc::clone(&list));
        Ok(list)
    }

    /// Store a sheet, replacing any existing entry for `key`.
    pub fn insert(&self, key: &str, list: Arc<ImageList<S>>) {
        self.entries.write().insert(key.to_string(), list);
    }

    /// Drop the given keys. Callers already holding a sheet keep it.
    pub fn remove<K: AsRef<str>>(&self, keys: &[K]) {
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(key.as_ref());
        }
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
