//! In-memory `PosBackend` for tests.
//!
//! Deterministic stand-in for the remote service: products and failure
//! injection are set up front, call counters record what the engine
//! actually did, and optional per-call delays let tests hold a request in
//! flight while something else happens.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use till_client::{ClientError, ClientResult, PosBackend, ProductFilter, TransactionReceipt};
use till_core::{Category, CheckoutRequest, Product};

#[derive(Default)]
pub(crate) struct FakeBackend {
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
    fetch_delay: Mutex<Duration>,
    submit_delay: Mutex<Duration>,
    fetch_error: Mutex<Option<ClientError>>,
    lookup_error: Mutex<Option<ClientError>>,
    submit_error: Mutex<Option<ClientError>>,
    fetch_count: AtomicU64,
    lookup_count: AtomicU64,
    submit_count: AtomicU64,
    last_request: Mutex<Option<CheckoutRequest>>,
}

impl FakeBackend {
    pub fn set_products(&self, products: Vec<Product>) {
        *self.products.lock().unwrap() = products;
    }

    pub fn set_categories(&self, categories: Vec<Category>) {
        *self.categories.lock().unwrap() = categories;
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = delay;
    }

    /// Makes the next `fetch_products` fail once.
    pub fn fail_next_fetch(&self, err: ClientError) {
        *self.fetch_error.lock().unwrap() = Some(err);
    }

    /// Makes the next `lookup_scan_code` fail once.
    pub fn fail_next_lookup(&self, err: ClientError) {
        *self.lookup_error.lock().unwrap() = Some(err);
    }

    /// Makes the next `submit_transaction` fail once.
    pub fn fail_next_submit(&self, err: ClientError) {
        *self.submit_error.lock().unwrap() = Some(err);
    }

    pub fn fetch_calls(&self) -> u64 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    pub fn lookup_calls(&self) -> u64 {
        self.lookup_count.load(Ordering::Relaxed)
    }

    pub fn submit_calls(&self) -> u64 {
        self.submit_count.load(Ordering::Relaxed)
    }

    /// The body of the most recent transaction submission.
    pub fn last_request(&self) -> Option<CheckoutRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl PosBackend for FakeBackend {
    async fn fetch_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        // State is captured before the delay, so a slow response carries
        // the world as it was when the request left.
        let error = self.fetch_error.lock().unwrap().take();
        let products: Vec<Product> = {
            let products = self.products.lock().unwrap();
            products
                .iter()
                .filter(|p| {
                    filter
                        .search
                        .as_deref()
                        .map_or(true, |s| p.name.to_lowercase().contains(&s.to_lowercase()))
                        && filter
                            .category_id
                            .as_deref()
                            .map_or(true, |c| p.category_id.as_deref() == Some(c))
                })
                .cloned()
                .collect()
        };
        let delay = *self.fetch_delay.lock().unwrap();

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = error {
            return Err(err);
        }
        Ok(products)
    }

    async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn lookup_scan_code(&self, code: &str) -> ClientResult<Option<Product>> {
        self.lookup_count.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = self.lookup_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.scan_code.as_deref() == Some(code))
            .cloned())
    }

    async fn submit_transaction(
        &self,
        request: &CheckoutRequest,
    ) -> ClientResult<TransactionReceipt> {
        let n = self.submit_count.fetch_add(1, Ordering::Relaxed) + 1;
        *self.last_request.lock().unwrap() = Some(request.clone());

        let error = self.submit_error.lock().unwrap().take();
        let delay = *self.submit_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = error {
            return Err(err);
        }
        Ok(TransactionReceipt {
            transaction_id: format!("tx-{}", n),
            receipt_number: format!("R-{:04}", n),
        })
    }
}
