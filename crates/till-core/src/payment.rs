//! # Payment Calculator
//!
//! Tender selection and change computation for the in-progress sale.
//!
//! Sufficiency and change are pure functions of `(tender state, amount due)`.
//! The amount due always comes from the cart at call time, so a cart
//! mutation can never leave a stale change figure behind - there is nothing
//! here to go stale.
//!
//! ## Raw Entry
//! The cash amount is stored exactly as the operator typed it. Garbage or
//! negative input computes as zero but is never rewritten into the field;
//! the operator sees what they typed and corrects it themselves.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::TenderType;

// =============================================================================
// Payment State
// =============================================================================

/// The payment snapshot for the current sale.
///
/// Lifecycle: reset whenever the cart total changes or the cart modal
/// opens; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentState {
    tender: TenderType,
    /// Raw operator input for cash, verbatim. Empty for card/wallet.
    entered: String,
}

impl PaymentState {
    /// Fresh snapshot: cash tender, nothing entered.
    pub fn new() -> Self {
        PaymentState::default()
    }

    /// The currently selected tender.
    #[inline]
    pub fn tender(&self) -> TenderType {
        self.tender
    }

    /// The raw entered amount, exactly as typed.
    #[inline]
    pub fn entered_raw(&self) -> &str {
        &self.entered
    }

    /// Selects a tender type.
    ///
    /// Switching away from Cash discards the entered amount; card/wallet
    /// always tender exactly the amount due.
    pub fn set_tender(&mut self, tender: TenderType) {
        if !tender.is_cash() {
            self.entered.clear();
        }
        self.tender = tender;
    }

    /// Stores the operator's raw cash entry. Ignored for card/wallet.
    pub fn set_amount_entered(&mut self, raw: impl Into<String>) {
        if self.tender.is_cash() {
            self.entered = raw.into();
        }
    }

    /// Quick-amount shortcut: fills the entry with a preset denomination.
    pub fn quick_amount(&mut self, amount: Money) {
        self.set_amount_entered(amount.cents().to_string());
    }

    /// "Exact" shortcut: tendered = due.
    pub fn exact(&mut self, due: Money) {
        self.set_amount_entered(due.cents().to_string());
    }

    /// The effective tendered amount for a given amount due.
    ///
    /// Cash parses the raw entry (non-numeric or negative counts as zero);
    /// card/wallet always tender the exact amount due.
    pub fn amount_tendered(&self, due: Money) -> Money {
        if !self.tender.is_cash() {
            return due;
        }
        let cents = self
            .entered
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|c| *c >= 0)
            .unwrap_or(0);
        Money::from_cents(cents)
    }

    /// `tendered >= due` for cash; always true for card/wallet.
    pub fn is_sufficient(&self, due: Money) -> bool {
        self.amount_tendered(due) >= due
    }

    /// Change due: `max(0, tendered - due)`. Never negative.
    pub fn change(&self, due: Money) -> Money {
        self.amount_tendered(due).saturating_sub_zero(due)
    }

    /// Back to the fresh state (cash, empty entry).
    pub fn reset(&mut self) {
        *self = PaymentState::new();
    }
}

// =============================================================================
// Payment View
// =============================================================================

/// Computed payment figures for the presentation surfaces.
///
/// A derived value, rebuilt from `PaymentState` + the current cart total on
/// every snapshot; never stored across mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub tender: TenderType,
    pub entered: String,
    pub amount_due: Money,
    pub amount_tendered: Money,
    pub change_due: Money,
    pub sufficient: bool,
}

impl PaymentView {
    /// Projects the payment state against an amount due.
    pub fn compute(state: &PaymentState, due: Money) -> Self {
        PaymentView {
            tender: state.tender(),
            entered: state.entered_raw().to_string(),
            amount_due: due,
            amount_tendered: state.amount_tendered(due),
            change_due: state.change(due),
            sufficient: state.is_sufficient(due),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
