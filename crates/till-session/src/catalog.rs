//! # Catalog Cache
//!
//! The last-fetched set of sellable products and categories.
//!
//! ## Contract
//! - A refresh replaces the entire cached set; there are no incremental
//!   updates - a stock change is only visible after an explicit refresh
//! - A failed refresh surfaces the error and keeps the stale cache
//! - Rapid successive refreshes are last-request-wins: a superseded
//!   in-flight response is discarded, never applied over newer data
//! - Cart operations never mutate the cache; stock becomes authoritative
//!   only on successful server commit

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use till_client::{ClientResult, PosBackend, ProductFilter};
use till_core::{Category, Product};

#[derive(Default)]
struct CacheInner {
    products: Vec<Product>,
    categories: Vec<Category>,
    /// Bumped when a refresh starts; a response only applies if no newer
    /// refresh has started since it left.
    generation: u64,
}

/// Read-through cache of the remote catalog.
pub struct CatalogCache {
    backend: Arc<dyn PosBackend>,
    inner: Mutex<CacheInner>,
}

impl CatalogCache {
    /// Creates an empty cache over a backend. Call [`CatalogCache::refresh`]
    /// to populate it.
    pub fn new(backend: Arc<dyn PosBackend>) -> Self {
        CatalogCache {
            backend,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Replaces the cached product set with a fresh fetch.
    ///
    /// On failure the stale cache is retained and the error is returned.
    /// If another refresh started while this one was in flight, the stale
    /// response is discarded (last request wins).
    pub async fn refresh(&self, filter: &ProductFilter) -> ClientResult<()> {
        let my_generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.generation
        };

        // Lock is NOT held across the await.
        let products = self.backend.fetch_products(filter).await?;

        let mut inner = self.lock();
        if inner.generation != my_generation {
            debug!(
                generation = my_generation,
                current = inner.generation,
                "superseded catalog refresh discarded"
            );
            return Ok(());
        }

        info!(count = products.len(), "catalog refreshed");
        inner.products = products;
        Ok(())
    }

    /// Replaces the cached category list.
    pub async fn refresh_categories(&self) -> ClientResult<()> {
        let categories = self.backend.fetch_categories().await?;
        self.lock().categories = categories;
        Ok(())
    }

    /// Looks up a product by identifier.
    pub fn find_by_id(&self, id: &str) -> Option<Product> {
        self.lock().products.iter().find(|p| p.id == id).cloned()
    }

    /// Looks up a product by scan code (exact match).
    pub fn find_by_scan_code(&self, code: &str) -> Option<Product> {
        self.lock()
            .products
            .iter()
            .find(|p| p.scan_code.as_deref() == Some(code))
            .cloned()
    }

    /// The currently cached product set.
    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    /// The currently cached categories.
    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().expect("catalog cache mutex poisoned")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
