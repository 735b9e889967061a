//! Translation catalog plus the bibles loaded from it
//!
//! Decoding a translation is expensive, so every bible is loaded at most once
//! per key and shared afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::versions::{Catalog, Version};

use super::bible::{Bible, SharedBible};

/// The catalog, the cache of loaded bibles and the one being read
///
/// Loaded bibles stay cached for the lifetime of the library, which keeps
/// the weak references held by bookmarks alive.
#[derive(Debug)]
pub struct BibleLibrary {
    catalog: Catalog,
    cache: HashMap<String, SharedBible>,
    current: Option<SharedBible>,
}

impl BibleLibrary {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            cache: HashMap::new(),
            current: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn version(&self, key: &str) -> Option<&Version> {
        self.catalog.get(key)
    }

    /// The bible for `key`, loading it on first use
    pub fn get_bible(&mut self, key: &str) -> Result<SharedBible, String> {
        if let Some(bible) = self.cache.get(key) {
            return Ok(Arc::clone(bible));
        }

        let version = self
            .catalog
            .get(key)
            .cloned()
            .ok_or_else(|| format!("Unknown translation {:?}", key))?;

        log::info!("Loading {} ({})", version.name(), key);
        let bible = Arc::new(Mutex::new(Bible::load(version)?));
        self.cache.insert(key.to_string(), Arc::clone(&bible));
        Ok(bible)
    }

    /// Whether the bible for `key` has been loaded already
    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// The bible currently being read
    pub fn current(&self) -> Option<SharedBible> {
        self.current.clone()
    }

    pub(crate) fn set_current(&mut self, bible: Option<SharedBible>) {
        self.current = bible;
    }
}
