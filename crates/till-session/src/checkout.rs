//! # Checkout Coordinator
//!
//! The phase machine for settling a sale:
//!
//! ```text
//! Idle ──► Validating ──► Submitting ──► Settled
//!   ▲          │              │
//!   │   guard failed          └────────► Failed
//!   └──────────┘                  (cart and payment untouched)
//! ```
//!
//! Guard: the cart is non-empty AND (tender is not cash OR the tendered
//! amount covers the total). A guard failure stays at Idle and surfaces the
//! reason; nothing is sent. Validation builds the immutable
//! [`CheckoutRequest`] snapshot and exactly one submission goes out; while
//! it is in flight a second submit is rejected outright.
//!
//! The async orchestration around this machine lives in
//! [`crate::session::PosSession`]; everything here is synchronous and pure
//! so the guards and the wire projection are unit-testable without a
//! backend.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use till_core::{Cart, CheckoutRequest, PaymentState};

use crate::error::CheckoutError;

// =============================================================================
// Checkout Phase
// =============================================================================

/// Where the coordinator currently is.
///
/// `Settled` and `Failed` are resting states: a new cart mutation returns
/// the machine to `Idle`, and `submit` may be called again from `Failed`
/// (retry) with the preserved cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Settled,
    Failed,
}

impl CheckoutPhase {
    /// Whether a submission is currently awaiting the server.
    #[inline]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, CheckoutPhase::Submitting)
    }
}

// =============================================================================
// Guard & Projection
// =============================================================================

/// The Idle -> Validating guard.
///
/// Returns the reason when the attempt must not proceed. The payment rule
/// only bites for cash: card and wallet always tender exactly the amount
/// due.
pub fn validate(cart: &Cart, payment: &PaymentState) -> Result<(), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let due = cart.total();
    if !payment.is_sufficient(due) {
        return Err(CheckoutError::InsufficientPayment {
            due,
            tendered: payment.amount_tendered(due),
        });
    }
    Ok(())
}

/// Builds the immutable submission snapshot from the current cart and
/// payment state. Called once per attempt, after the guard has passed.
pub fn build_request(
    operator_id: &str,
    cart: &Cart,
    payment: &PaymentState,
) -> CheckoutRequest {
    let due = cart.total();
    CheckoutRequest {
        operator_id: operator_id.to_string(),
        payment_method: payment.tender(),
        total_amount: due,
        amount_paid: payment.amount_tendered(due),
        change_due: payment.change(due),
        items: cart.checkout_lines(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
