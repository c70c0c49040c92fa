//! # HTTP Backend
//!
//! Production [`PosBackend`] over reqwest.
//!
//! One `HttpBackend` per service; the underlying reqwest client pools
//! connections, so cloning is cheap and shares the pool. Every request
//! carries the client-wide timeout - a hung service surfaces as
//! [`ClientError::Timeout`] rather than a stuck checkout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use till_core::{Category, CheckoutRequest, Product};

use crate::backend::{PosBackend, ProductFilter, TransactionReceipt};
use crate::error::{ClientError, ClientResult};

/// Request timeout for every call to the service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// Error Body
// =============================================================================

/// Error payload the service attaches to non-success responses.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    /// Machine-readable kind; `"stock_conflict"` is the one we act on.
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-success status + error body to a [`ClientError`].
///
/// A conflict is recognized either by HTTP 409 or by the body kind, so the
/// mapping survives either convention on the server side.
fn classify_error(status: u16, body: ApiErrorBody) -> ClientError {
    let is_conflict = status == StatusCode::CONFLICT.as_u16()
        || body.error.as_deref() == Some("stock_conflict");

    if is_conflict {
        ClientError::StockConflict {
            message: body
                .message
                .unwrap_or_else(|| "stock changed on the server since last refresh".to_string()),
        }
    } else {
        ClientError::Api {
            status,
            message: body
                .message
                .unwrap_or_else(|| format!("request failed with status {}", status)),
        }
    }
}

// =============================================================================
// HTTP Backend
// =============================================================================

/// reqwest-based implementation of [`PosBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a backend for a service base URL (e.g. `https://pos.example/api/`).
    pub fn new(base_url: Url) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::from)?;
        Ok(HttpBackend { http, base_url })
    }

    /// Creates a backend reusing an existing reqwest client.
    pub fn with_client(http: Client, base_url: Url) -> Self {
        HttpBackend { http, base_url }
    }

    /// Extends the base URL with path segments (segments are URL-encoded,
    /// so raw scan codes are safe to pass through).
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Passes a success response through, or reads the error body and maps it.
    async fn check(response: Response) -> ClientResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
        Err(classify_error(status, body))
    }
}

#[async_trait]
impl PosBackend for HttpBackend {
    async fn fetch_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        let url = self.endpoint(&["products"])?;
        debug!(%url, ?filter, "fetching products");

        let response = self
            .http
            .get(url)
            .query(&filter.query_pairs())
            .send()
            .await?;
        let products = Self::check(response).await?.json::<Vec<Product>>().await?;

        debug!(count = products.len(), "products fetched");
        Ok(products)
    }

    async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        let url = self.endpoint(&["categories"])?;
        debug!(%url, "fetching categories");

        let response = self.http.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn lookup_scan_code(&self, code: &str) -> ClientResult<Option<Product>> {
        let url = self.endpoint(&["products", "scan", code])?;
        debug!(%url, "scan code lookup");

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    async fn submit_transaction(
        &self,
        request: &CheckoutRequest,
    ) -> ClientResult<TransactionReceipt> {
        let url = self.endpoint(&["transactions"])?;
        debug!(%url, total = %request.total_amount, items = request.items.len(), "submitting transaction");

        let response = self.http.post(url).json(request).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
