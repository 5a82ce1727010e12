//! Per-category try-on result cache.
//!
//! One entry per category, overwritten wholesale. An entry is only returned
//! while its `modelImage` matches the caller's current profile picture; the
//! stored timestamp is informational and never expires anything.

use std::sync::Arc;

use fitting_room_core::{Category, TryOnCacheEntry, TryOnResults};
use tracing::{debug, warn};

use crate::store::{LocalStore, StoreError, keys};

/// Try-on results cached in local storage.
#[derive(Clone)]
pub struct TryOnCache {
    store: Arc<dyn LocalStore>,
}

impl TryOnCache {
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The entry for `category`, if present and generated from `model_image`.
    ///
    /// A malformed entry is logged and treated as a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn get(
        &self,
        category: Category,
        model_image: &str,
    ) -> Result<Option<TryOnCacheEntry>, StoreError> {
        let Some(raw) = self.store.get(&keys::try_on_results(category))? else {
            debug!(%category, "Try-on cache miss");
            return Ok(None);
        };

        let entry: TryOnCacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%category, error = %e, "Cached try-on results are malformed, regenerating");
                return Ok(None);
            }
        };

        if entry.is_valid_for(model_image) {
            debug!(%category, garments = entry.results.len(), "Try-on cache hit");
            Ok(Some(entry))
        } else {
            debug!(%category, "Try-on cache entry belongs to another model image");
            Ok(None)
        }
    }

    /// Store `results` for `category`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn put(
        &self,
        category: Category,
        results: TryOnResults,
        model_image: &str,
    ) -> Result<TryOnCacheEntry, StoreError> {
        let entry = TryOnCacheEntry::new(results, model_image);
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&keys::try_on_results(category), &raw)?;
        Ok(entry)
    }

    /// Drop the entry for one category.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self, category: Category) -> Result<(), StoreError> {
        self.store.remove(&keys::try_on_results(category))
    }

    /// Drop every try-on entry, including keys of categories this build does
    /// not know. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        let stale: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| keys::is_try_on_results(k))
            .collect();
        for key in &stale {
            self.store.remove(key)?;
        }
        Ok(stale.len())
    }
}
