//! # Domain Types
//!
//! Core domain types shared across the engine.
//!
//! ## Snapshot Semantics
//! `Product` is an immutable snapshot from the last catalog fetch. The cart
//! never holds a `Product` by reference - it copies the fields it needs at
//! add time (price, name, stock ceiling) so a later catalog refresh cannot
//! retroactively change an in-progress sale.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product & Category
// =============================================================================

/// A sellable product as last fetched from the catalog service.
///
/// `quantity` is the authoritative stock level at fetch time; it becomes the
/// stock ceiling of a cart line when the product is added. It is only
/// updated by a full catalog refresh, never by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier assigned by the catalog service.
    pub id: String,

    /// Display name shown to the operator and on the cart line.
    pub name: String,

    /// Unit selling price in cents.
    pub price: Money,

    /// Current stock level (the ceiling for cart quantities).
    pub quantity: i64,

    /// Barcode / scan code, if the product carries one.
    pub scan_code: Option<String>,

    /// Category the product is filed under.
    pub category_id: Option<String>,
}

impl Product {
    /// Checks whether the product has any sellable stock.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// A product category, used only as a browse filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Tender Type
// =============================================================================

/// The payment method selected for the current checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TenderType {
    /// Physical cash; the operator enters the amount received.
    Cash,
    /// Card on an external terminal; tendered always equals the amount due.
    Card,
    /// Mobile wallet; tendered always equals the amount due.
    Wallet,
}

impl TenderType {
    /// Whether this tender requires the operator to enter an amount.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, TenderType::Cash)
    }
}

impl Default for TenderType {
    fn default() -> Self {
        TenderType::Cash
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// One line of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents, frozen at add time.
    pub unit_price: Money,
    /// `unit_price` x `quantity`.
    pub line_total: Money,
}

/// Immutable projection of cart + payment state, built once at submission.
///
/// Sent as the body of `POST transactions`. On failure the same cart can be
/// corrected and resubmitted, which builds a fresh request; a request value
/// itself is never mutated or reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// The cashier who settled the sale.
    pub operator_id: String,

    /// Tender selected at submission time.
    pub payment_method: TenderType,

    /// Sum of all line totals, in cents.
    pub total_amount: Money,

    /// Amount actually received (equals `total_amount` for card/wallet).
    pub amount_paid: Money,

    /// Change returned to the customer (zero for card/wallet).
    pub change_due: Money,

    pub items: Vec<CheckoutLine>,
}

// =============================================================================
// Unit Tests
// =============================================================================
