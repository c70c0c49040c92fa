//! # Session Store
//!
//! One `PosSession` per operator terminal. It owns the cart ledger, the
//! payment snapshot, the checkout phase and the modal flag behind a single
//! mutex, and publishes a [`SessionSnapshot`] on every mutation - the only
//! thing the presentation surfaces ever read.
//!
//! ## Ordering Guarantee
//! Each mutation publishes before its call returns, under the same lock
//! that applied it. Any read that follows a mutation (including re-renders
//! of both surfaces) therefore observes that mutation.
//!
//! ## Payment Snapshot Lifecycle
//! The payment snapshot resets whenever the cart total changes and
//! whenever the cart modal opens. Rejected cart mutations change nothing,
//! so they reset nothing.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use till_client::{PosBackend, ProductFilter, TransactionReceipt};
use till_core::{
    Cart, CartError, CoreResult, Money, PaymentState, PaymentView, Product, TenderType,
};

use crate::catalog::CatalogCache;
use crate::checkout::{self, CheckoutPhase};
use crate::error::{CheckoutError, SessionError};
use crate::scan::{Resolution, ScanResolver};
use crate::surface::{SessionSnapshot, SurfaceHandle};

// =============================================================================
// Scan Outcome
// =============================================================================

/// What happened to one scan, end to end (resolve + add).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Resolved and added to the cart.
    Added(Product),
    /// Resolved, but the ledger refused it (out of stock / at ceiling).
    Rejected { product: Product, reason: CartError },
    /// No catalog entry for the code, locally or remotely.
    NotFound { code: String },
}

// =============================================================================
// Session State
// =============================================================================

struct SessionState {
    cart: Cart,
    payment: PaymentState,
    phase: CheckoutPhase,
    last_error: Option<String>,
    modal_open: bool,
}

impl SessionState {
    fn new() -> Self {
        SessionState {
            cart: Cart::new(),
            payment: PaymentState::new(),
            phase: CheckoutPhase::Idle,
            last_error: None,
            modal_open: false,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let total = self.cart.total();
        SessionSnapshot {
            items: self.cart.items().to_vec(),
            total,
            payment: PaymentView::compute(&self.payment, total),
            phase: self.phase,
            last_error: self.last_error.clone(),
            modal_open: self.modal_open,
        }
    }
}

// =============================================================================
// Pos Session
// =============================================================================

/// The shared store behind both presentation surfaces.
///
/// Operator identity and the backend are injected at construction; nothing
/// in here reaches for ambient context.
pub struct PosSession {
    operator_id: String,
    backend: Arc<dyn PosBackend>,
    catalog: Arc<CatalogCache>,
    resolver: ScanResolver,
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl PosSession {
    /// Creates a session for one operator over a backend.
    pub fn new(operator_id: impl Into<String>, backend: Arc<dyn PosBackend>) -> Self {
        let catalog = Arc::new(CatalogCache::new(backend.clone()));
        let resolver = ScanResolver::new(catalog.clone(), backend.clone());
        let state = SessionState::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot());

        PosSession {
            operator_id: operator_id.into(),
            backend,
            catalog,
            resolver,
            state: Mutex::new(state),
            snapshot_tx,
        }
    }

    /// The catalog cache (browse + refresh).
    pub fn catalog(&self) -> &Arc<CatalogCache> {
        &self.catalog
    }

    /// Subscribes a presentation surface to the snapshot stream.
    pub fn subscribe(&self) -> SurfaceHandle {
        SurfaceHandle::new(self.snapshot_tx.subscribe())
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Adds one unit of a product (from a scan or a browse row).
    pub fn add_item(&self, product: &Product) -> CoreResult<()> {
        debug!(product_id = %product.id, "add item");
        self.mutate_cart(|cart| cart.add_item(product))
    }

    /// Adds one unit of a product addressed by catalog id.
    pub fn add_to_cart(&self, product_id: &str) -> Result<(), SessionError> {
        let product = self
            .catalog
            .find_by_id(product_id)
            .ok_or_else(|| SessionError::UnknownProduct(product_id.to_string()))?;
        self.add_item(&product).map_err(SessionError::from)
    }

    /// Applies a signed quantity delta to a cart line.
    pub fn adjust_quantity(&self, product_id: &str, delta: i64) -> CoreResult<()> {
        debug!(product_id, delta, "adjust quantity");
        self.mutate_cart(|cart| cart.adjust_quantity(product_id, delta))
    }

    /// Removes a cart line.
    pub fn remove_item(&self, product_id: &str) -> CoreResult<()> {
        debug!(product_id, "remove item");
        self.mutate_cart(|cart| cart.remove_item(product_id))
    }

    /// Empties the cart on explicit operator confirmation.
    pub fn clear_cart(&self) {
        debug!("clear cart");
        let _ = self.mutate_cart(|cart| {
            cart.clear();
            Ok(())
        });
    }

    /// Resolves a decoded barcode and, when found, adds it to the cart.
    pub async fn scan(&self, code: &str) -> ScanOutcome {
        match self.resolver.resolve(code).await {
            Resolution::Found(product) => match self.add_item(&product) {
                Ok(()) => ScanOutcome::Added(product),
                Err(reason) => ScanOutcome::Rejected { product, reason },
            },
            Resolution::NotFound { code } => ScanOutcome::NotFound { code },
        }
    }

    // =========================================================================
    // Payment Operations
    // =========================================================================

    /// Selects the tender type for the current sale.
    pub fn set_tender(&self, tender: TenderType) {
        self.mutate_payment(|state| state.payment.set_tender(tender));
    }

    /// Stores the operator's raw cash entry.
    pub fn enter_amount(&self, raw: &str) {
        self.mutate_payment(|state| state.payment.set_amount_entered(raw));
    }

    /// Quick-amount preset (e.g. a 50.00 note button).
    pub fn quick_amount(&self, amount: Money) {
        self.mutate_payment(|state| state.payment.quick_amount(amount));
    }

    /// "Exact" shortcut: tendered = the current total due.
    pub fn exact_amount(&self) {
        self.mutate_payment(|state| {
            let due = state.cart.total();
            state.payment.exact(due);
        });
    }

    // =========================================================================
    // Modal Surface
    // =========================================================================

    /// Opens the mobile cart modal. Resets the payment snapshot; never
    /// touches the cart.
    pub fn open_cart_modal(&self) {
        self.mutate_payment(|state| {
            state.payment.reset();
            state.modal_open = true;
        });
    }

    /// Closes the modal. The cart and the entered payment are left as-is;
    /// the payment resets on the next open.
    pub fn close_cart_modal(&self) {
        self.mutate_payment(|state| state.modal_open = false);
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Refreshes the catalog cache (browse filters, post-settlement sync).
    pub async fn refresh_catalog(&self, filter: &ProductFilter) -> till_client::ClientResult<()> {
        self.catalog.refresh(filter).await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Validates and submits the current sale as a single transaction.
    ///
    /// At most one submission is in flight at a time; a second call while
    /// Submitting is rejected outright without touching any state. On
    /// settlement the cart is cleared, the payment snapshot reset, the
    /// modal closed and the catalog refreshed. On failure the cart and
    /// payment snapshot are preserved exactly for an operator retry.
    pub async fn submit(&self) -> Result<TransactionReceipt, CheckoutError> {
        let request = {
            let mut state = self.lock();
            if state.phase.is_submitting() {
                return Err(CheckoutError::SubmissionInFlight);
            }

            state.phase = CheckoutPhase::Validating;
            if let Err(err) = checkout::validate(&state.cart, &state.payment) {
                state.phase = CheckoutPhase::Idle;
                state.last_error = Some(err.to_string());
                self.publish(&state);
                return Err(err);
            }

            let request = checkout::build_request(&self.operator_id, &state.cart, &state.payment);
            state.phase = CheckoutPhase::Submitting;
            state.last_error = None;
            self.publish(&state);
            request
        };

        debug!(
            total = %request.total_amount,
            items = request.items.len(),
            tender = ?request.payment_method,
            "submitting transaction"
        );

        match self.backend.submit_transaction(&request).await {
            Ok(receipt) => {
                {
                    let mut state = self.lock();
                    state.cart.clear();
                    state.payment.reset();
                    state.phase = CheckoutPhase::Settled;
                    state.last_error = None;
                    state.modal_open = false;
                    self.publish(&state);
                }
                info!(
                    transaction_id = %receipt.transaction_id,
                    receipt_number = %receipt.receipt_number,
                    "sale settled"
                );

                // Absorb the server-side stock decrement. A failed refresh
                // keeps the stale cache; the settlement itself stands.
                if let Err(err) = self.catalog.refresh(&ProductFilter::all()).await {
                    warn!(%err, "post-settlement catalog refresh failed");
                }
                Ok(receipt)
            }
            Err(err) => {
                warn!(%err, "submission failed; cart preserved for retry");
                let mut state = self.lock();
                state.phase = CheckoutPhase::Failed;
                state.last_error = Some(err.to_string());
                self.publish(&state);
                Err(CheckoutError::Backend(err))
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Runs a cart mutation; on success resets the payment snapshot (the
    /// total changed), returns a resting phase to Idle, and publishes. A
    /// rejected mutation changes nothing and publishes nothing.
    fn mutate_cart<F>(&self, f: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Cart) -> CoreResult<()>,
    {
        let mut state = self.lock();
        f(&mut state.cart)?;

        state.payment.reset();
        if matches!(state.phase, CheckoutPhase::Settled | CheckoutPhase::Failed) {
            state.phase = CheckoutPhase::Idle;
        }
        state.last_error = None;
        self.publish(&state);
        Ok(())
    }

    /// Runs an infallible payment/surface mutation and publishes.
    fn mutate_payment<F>(&self, f: F)
    where
        F: FnOnce(&mut SessionState),
    {
        let mut state = self.lock();
        f(&mut state);
        self.publish(&state);
    }

    fn publish(&self, state: &SessionState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session mutex poisoned")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use std::time::Duration;
    use till_client::ClientError;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(price_cents),
            quantity: stock,
            scan_code: Some(format!("scan-{}", id)),
            category_id: None,
        }
    }

    fn session_with(products: Vec<Product>) -> (Arc<FakeBackend>, PosSession) {
        let backend = Arc::new(FakeBackend::default());
        backend.set_products(products);
        let session = PosSession::new("op-7", backend.clone());
        (backend, session)
    }

    #[tokio::test]
    async fn test_add_until_ceiling_through_session() {
        // Product A: price 100, stock 5
        let (_backend, session) = session_with(vec![]);
        let a = product("a", 100, 5);

        session.add_item(&a).unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.total.cents(), 100);
        assert_eq!(snap.items[0].quantity, 1);

        for _ in 0..3 {
            session.add_item(&a).unwrap();
        }
        let snap = session.snapshot();
        assert_eq!(snap.total.cents(), 400);
        assert_eq!(snap.items[0].quantity, 4);

        // 5th add lands on the ceiling; the 6th is rejected
        session.add_item(&a).unwrap();
        let err = session.add_item(&a).unwrap_err();
        assert!(matches!(err, CartError::StockLimitReached { ceiling: 5, .. }));
        assert_eq!(session.snapshot().items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_both_surfaces_observe_every_mutation() {
        let (_backend, session) = session_with(vec![]);
        let sidebar = session.subscribe();
        let modal = session.subscribe();

        session.add_item(&product("a", 150, 3)).unwrap();
        session.adjust_quantity("a", 1).unwrap();

        assert_eq!(sidebar.current(), modal.current());
        assert_eq!(sidebar.current().total.cents(), 300);
        assert_eq!(sidebar.current().items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_payment_resets_when_total_changes() {
        let (_backend, session) = session_with(vec![]);
        session.add_item(&product("a", 400, 5)).unwrap();
        session.enter_amount("500");
        assert_eq!(session.snapshot().payment.amount_tendered.cents(), 500);

        // Any successful cart mutation changes the total and drops the entry
        session.add_item(&product("b", 50, 2)).unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.payment.entered, "");
        assert_eq!(snap.payment.amount_tendered.cents(), 0);

        // A rejected mutation resets nothing
        session.enter_amount("600");
        let _ = session.adjust_quantity("ghost", 1);
        assert_eq!(session.snapshot().payment.entered, "600");
    }

    #[tokio::test]
    async fn test_tender_switch_recomputes_change() {
        // Cash due 400, tendered 500 -> sufficient, change 100.
        // Switch to card -> change 0, sufficient regardless of prior entry.
        let (_backend, session) = session_with(vec![]);
        session.add_item(&product("a", 400, 5)).unwrap();

        session.enter_amount("500");
        let payment = session.snapshot().payment;
        assert!(payment.sufficient);
        assert_eq!(payment.change_due.cents(), 100);

        session.set_tender(TenderType::Card);
        let payment = session.snapshot().payment;
        assert!(payment.sufficient);
        assert_eq!(payment.change_due.cents(), 0);
    }

    #[tokio::test]
    async fn test_quick_and_exact_amounts() {
        let (_backend, session) = session_with(vec![]);
        session.add_item(&product("a", 750, 5)).unwrap();

        session.quick_amount(Money::from_cents(1000));
        assert_eq!(session.snapshot().payment.change_due.cents(), 250);

        session.exact_amount();
        let payment = session.snapshot().payment;
        assert_eq!(payment.amount_tendered.cents(), 750);
        assert_eq!(payment.change_due.cents(), 0);
    }

    #[tokio::test]
    async fn test_modal_resets_payment_but_not_cart() {
        let (_backend, session) = session_with(vec![]);
        session.add_item(&product("a", 400, 5)).unwrap();
        session.enter_amount("500");

        session.open_cart_modal();
        let snap = session.snapshot();
        assert!(snap.modal_open);
        assert_eq!(snap.payment.entered, "");
        assert_eq!(snap.items.len(), 1);

        // Close mid-entry: cart intact, entry survives until the next open
        session.enter_amount("300");
        session.close_cart_modal();
        let snap = session.snapshot();
        assert!(!snap.modal_open);
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.payment.entered, "300");

        session.open_cart_modal();
        assert_eq!(session.snapshot().payment.entered, "");
    }

    #[tokio::test]
    async fn test_add_to_cart_by_id_requires_catalog_entry() {
        let (_backend, session) = session_with(vec![product("a", 100, 5)]);
        session.refresh_catalog(&ProductFilter::all()).await.unwrap();

        session.add_to_cart("a").unwrap();
        assert_eq!(session.snapshot().items.len(), 1);

        let err = session.add_to_cart("ghost").unwrap_err();
        assert_eq!(err, SessionError::UnknownProduct("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_scan_adds_and_reports() {
        let (backend, session) = session_with(vec![product("a", 100, 1)]);

        let outcome = session.scan("scan-a").await;
        assert!(matches!(outcome, ScanOutcome::Added(ref p) if p.id == "a"));
        assert_eq!(session.snapshot().items[0].quantity, 1);

        // Second scan hits the ceiling of 1
        let outcome = session.scan("scan-a").await;
        assert!(matches!(
            outcome,
            ScanOutcome::Rejected {
                reason: CartError::StockLimitReached { .. },
                ..
            }
        ));

        let outcome = session.scan("junk").await;
        assert_eq!(
            outcome,
            ScanOutcome::NotFound {
                code: "junk".to_string()
            }
        );
        assert!(backend.submit_calls() == 0);
    }

    #[tokio::test]
    async fn test_submit_settles_and_refreshes_catalog() {
        let (backend, session) = session_with(vec![product("a", 100, 5)]);
        let a = product("a", 100, 5);
        for _ in 0..4 {
            session.add_item(&a).unwrap();
        }
        session.enter_amount("500");

        let receipt = session.submit().await.unwrap();
        assert_eq!(receipt.transaction_id, "tx-1");

        let snap = session.snapshot();
        assert!(snap.items.is_empty());
        assert_eq!(snap.phase, CheckoutPhase::Settled);
        assert_eq!(snap.payment.entered, "");
        assert!(!snap.modal_open);
        assert_eq!(snap.last_error, None);

        // The settled sale went out exactly as displayed
        let request = backend.last_request().unwrap();
        assert_eq!(request.operator_id, "op-7");
        assert_eq!(request.total_amount.cents(), 400);
        assert_eq!(request.amount_paid.cents(), 500);
        assert_eq!(request.change_due.cents(), 100);
        assert_eq!(request.items[0].quantity, 4);

        // Catalog refreshed to absorb the server-side stock decrement
        assert_eq!(backend.fetch_calls(), 1);
        assert_eq!(backend.submit_calls(), 1);
    }

    #[tokio::test]
    async fn test_guard_empty_cart_makes_no_submission() {
        let (backend, session) = session_with(vec![]);

        let err = session.submit().await.unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
        let snap = session.snapshot();
        assert_eq!(snap.phase, CheckoutPhase::Idle);
        assert_eq!(snap.last_error.as_deref(), Some("cart is empty"));
        assert_eq!(backend.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_guard_insufficient_cash_makes_no_submission() {
        let (backend, session) = session_with(vec![]);
        session.add_item(&product("a", 400, 5)).unwrap();
        session.enter_amount("300");

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientPayment { .. }));
        assert_eq!(session.snapshot().phase, CheckoutPhase::Idle);
        assert_eq!(backend.submit_calls(), 0);

        // Card bypasses the cash guard
        session.set_tender(TenderType::Card);
        session.submit().await.unwrap();
        assert_eq!(backend.submit_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_preserves_cart_and_payment_exactly() {
        let (backend, session) = session_with(vec![product("a", 100, 5)]);
        let a = product("a", 100, 5);
        session.add_item(&a).unwrap();
        session.add_item(&a).unwrap();
        session.enter_amount("500");
        backend.fail_next_submit(ClientError::StockConflict {
            message: "Product a has 1 left".into(),
        });

        let before = session.snapshot();
        let err = session.submit().await.unwrap_err();
        assert_eq!(
            err,
            CheckoutError::Backend(ClientError::StockConflict {
                message: "Product a has 1 left".into()
            })
        );

        let after = session.snapshot();
        assert_eq!(after.phase, CheckoutPhase::Failed);
        assert!(after.last_error.as_deref().unwrap().contains("stock conflict"));
        // Cart and payment are bit-identical to their pre-submission values
        assert_eq!(after.items, before.items);
        assert_eq!(after.payment, before.payment);

        // Operator refreshes the catalog and retries the same cart
        session.refresh_catalog(&ProductFilter::all()).await.unwrap();
        session.submit().await.unwrap();
        assert_eq!(session.snapshot().phase, CheckoutPhase::Settled);
        assert_eq!(backend.submit_calls(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_then_plain_retry() {
        let (backend, session) = session_with(vec![]);
        session.add_item(&product("a", 400, 5)).unwrap();
        session.set_tender(TenderType::Card);
        backend.fail_next_submit(ClientError::Network("broken pipe".into()));

        let err = session.submit().await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Backend(ref inner) if inner.is_transient()
        ));
        assert_eq!(session.snapshot().items.len(), 1);

        session.submit().await.unwrap();
        assert!(session.snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn test_reentrancy_guard_rejects_second_submit() {
        let (backend, session) = session_with(vec![]);
        backend.set_submit_delay(Duration::from_millis(150));
        session.add_item(&product("a", 400, 5)).unwrap();
        session.set_tender(TenderType::Card);

        let session = Arc::new(session);
        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.submit().await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(session.snapshot().phase, CheckoutPhase::Submitting);

        let err = session.submit().await.unwrap_err();
        assert_eq!(err, CheckoutError::SubmissionInFlight);

        first.await.unwrap().unwrap();
        assert_eq!(session.snapshot().phase, CheckoutPhase::Settled);
        assert_eq!(backend.submit_calls(), 1);
    }

    #[tokio::test]
    async fn test_next_mutation_leaves_resting_phase() {
        let (_backend, session) = session_with(vec![]);
        session.add_item(&product("a", 400, 5)).unwrap();
        session.set_tender(TenderType::Card);
        session.submit().await.unwrap();
        assert_eq!(session.snapshot().phase, CheckoutPhase::Settled);

        // The next sale begins: back to Idle
        session.add_item(&product("b", 100, 2)).unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.phase, CheckoutPhase::Idle);
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.last_error, None);
    }
}
