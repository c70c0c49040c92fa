//! # Backend Trait & Wire DTOs
//!
//! [`PosBackend`] is the seam between the engine and the remote service.
//! It is object-safe so the session layer can hold an `Arc<dyn PosBackend>`
//! and tests can substitute an in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use till_core::{Category, CheckoutRequest, Product};

use crate::error::ClientResult;

// =============================================================================
// Product Filter
// =============================================================================

/// Query criteria for a catalog fetch (`GET products?search=&category=`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Free-text search over name/scan code; empty means no restriction.
    pub search: Option<String>,
    /// Restrict to one category.
    pub category_id: Option<String>,
}

impl ProductFilter {
    /// A filter that matches the whole catalog.
    pub fn all() -> Self {
        ProductFilter::default()
    }

    /// The query pairs for the products endpoint, skipping empty criteria.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search));
        }
        if let Some(category) = self.category_id.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("category", category));
        }
        pairs
    }
}

// =============================================================================
// Transaction Receipt
// =============================================================================

/// Acknowledgment returned by `POST transactions` on settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Server-assigned transaction id.
    pub transaction_id: String,
    /// Human-readable receipt number for the printed/displayed receipt.
    pub receipt_number: String,
}

// =============================================================================
// Backend Trait
// =============================================================================

/// The remote order/catalog service, as the engine sees it.
///
/// Implementations must not retry internally; retry policy belongs to the
/// caller (the scan resolver does not retry at all, the checkout
/// coordinator retries only on explicit operator action).
#[async_trait]
pub trait PosBackend: Send + Sync {
    /// Fetches the sellable product set matching a filter.
    async fn fetch_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>>;

    /// Fetches the category list.
    async fn fetch_categories(&self) -> ClientResult<Vec<Category>>;

    /// Looks up a single product by scan code. `Ok(None)` means the
    /// service does not know the code (a 404, not a failure).
    async fn lookup_scan_code(&self, code: &str) -> ClientResult<Option<Product>>;

    /// Submits a finalized transaction. Exactly one call per attempt.
    async fn submit_transaction(
        &self,
        request: &CheckoutRequest,
    ) -> ClientResult<TransactionReceipt>;
}

// =============================================================================
// Unit Tests
// =============================================================================
