//! # Checkout Error Types
//!
//! Why a checkout attempt did not settle. Guard failures never reach the
//! wire; backend failures arrive wrapped so the session can distinguish a
//! retryable transport fault from a stock conflict that needs a catalog
//! refresh first.

use thiserror::Error;

use till_client::ClientError;
use till_core::Money;

/// A checkout attempt that did not reach settlement.
///
/// The cart and payment snapshot are untouched in every case; the operator
/// corrects and resubmits from the same state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Guard failure: nothing to sell.
    #[error("cart is empty")]
    EmptyCart,

    /// Guard failure: cash tendered below the amount due.
    #[error("insufficient payment: {tendered} tendered, {due} due")]
    InsufficientPayment { due: Money, tendered: Money },

    /// Re-entrancy guard: a submission is already awaiting the server.
    #[error("a checkout is already being submitted")]
    SubmissionInFlight,

    /// The server rejected or the wire failed; see the inner error.
    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// Session-level rejection for operations that address the catalog by id.
///
/// A corrupted or out-of-date cache is never fatal: the mitigation is
/// always "reject the mutation and ask for a refresh".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The product id is not in the cached catalog.
    #[error("product {0} is not in the catalog; refresh and retry")]
    UnknownProduct(String),

    /// The underlying cart ledger refused the mutation.
    #[error(transparent)]
    Cart(#[from] till_core::CartError),
}

// =============================================================================
// Unit Tests
// =============================================================================
