//! # Scan Resolver
//!
//! Maps a decoded barcode string to a catalog entry.
//!
//! Resolution order: (1) the catalog cache by scan code, (2) a single
//! remote lookup on a cache miss, (3) `NotFound` carrying the original
//! code for display. No retries; each scan of the same code resolves
//! independently. The barcode decoding engine itself is upstream of this
//! component - it hands us nothing but decoded strings.

use std::sync::Arc;

use tracing::{debug, warn};

use till_client::PosBackend;
use till_core::Product;

use crate::catalog::CatalogCache;

/// Outcome of resolving one decoded scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The code maps to a sellable product.
    Found(Product),
    /// Neither the cache nor the service knows the code. Carries the
    /// original code so the surfaces can show it.
    NotFound { code: String },
}

/// Resolves decoded barcodes against the cache, falling back to the service.
pub struct ScanResolver {
    cache: Arc<CatalogCache>,
    backend: Arc<dyn PosBackend>,
}

impl ScanResolver {
    pub fn new(cache: Arc<CatalogCache>, backend: Arc<dyn PosBackend>) -> Self {
        ScanResolver { cache, backend }
    }

    /// Resolves one decoded scan code.
    ///
    /// A remote error is treated as not-found rather than surfaced: the
    /// operator sees "unknown code" and keeps scanning; nothing about a
    /// scan is worth interrupting the sale for.
    pub async fn resolve(&self, code: &str) -> Resolution {
        if let Some(product) = self.cache.find_by_scan_code(code) {
            debug!(code, product_id = %product.id, "scan resolved from cache");
            return Resolution::Found(product);
        }

        match self.backend.lookup_scan_code(code).await {
            Ok(Some(product)) => {
                debug!(code, product_id = %product.id, "scan resolved remotely");
                Resolution::Found(product)
            }
            Ok(None) => {
                debug!(code, "scan code unknown to the service");
                Resolution::NotFound {
                    code: code.to_string(),
                }
            }
            Err(err) => {
                warn!(code, %err, "scan lookup failed; reporting not found");
                Resolution::NotFound {
                    code: code.to_string(),
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
