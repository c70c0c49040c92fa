//! # Cart Ledger
//!
//! The authoritative in-memory list of line items for the in-progress sale.
//! Both presentation surfaces (desktop sidebar and mobile modal) render from
//! this one ledger; neither holds its own copy of quantities or totals.
//!
//! ## Invariants
//! - At most one line item per product id
//! - `1 <= quantity <= stock_ceiling` for every line, at all times
//! - A rejected mutation leaves the ledger untouched (all-or-nothing)
//! - `total()` is recomputed from the lines on every call, never cached
//!
//! ## Stock Ceiling
//! The ceiling is the product's stock level at the moment it was added,
//! frozen on the line. Catalog refreshes do not re-validate open carts;
//! the server is the final arbiter at submission time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CartError, CoreResult};
use crate::money::Money;
use crate::types::{CheckoutLine, Product};

// =============================================================================
// Line Item
// =============================================================================

/// One product's quantity within the current cart.
///
/// Name and unit price are denormalized copies captured at add time, so a
/// catalog refresh mid-sale cannot change what the customer is being charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product ID (reference back into the catalog).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub unit_price: Money,

    /// Quantity in the cart. Always >= 1; a line at quantity 0 is removed,
    /// never retained.
    pub quantity: i64,

    /// Stock level at time of adding; the maximum this line may reach.
    pub stock_ceiling: i64,

    /// When this line was first added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    fn from_product(product: &Product) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            stock_ceiling: product.quantity,
            added_at: Utc::now(),
        }
    }

    /// Line total (unit price x quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Whether the line sits at its stock ceiling.
    #[inline]
    pub fn at_ceiling(&self) -> bool {
        self.quantity >= self.stock_ceiling
    }
}

impl From<&LineItem> for CheckoutLine {
    fn from(line: &LineItem) -> Self {
        CheckoutLine {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart ledger.
///
/// Lines keep insertion order (the order the operator scanned them), and the
/// item list is private so every mutation path runs through the ceiling
/// checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - No line for this product yet: insert one at quantity 1 with the
    ///   ceiling frozen from `product.quantity`
    /// - `product.quantity == 0`: reject with [`CartError::OutOfStock`]
    /// - Line exists below its ceiling: increment by 1
    /// - Line exists at its ceiling: reject with
    ///   [`CartError::StockLimitReached`], line unchanged
    pub fn add_item(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product.id) {
            if line.quantity >= line.stock_ceiling {
                return Err(CartError::StockLimitReached {
                    name: line.name.clone(),
                    ceiling: line.stock_ceiling,
                });
            }
            line.quantity += 1;
            return Ok(());
        }

        if product.quantity == 0 {
            return Err(CartError::OutOfStock {
                name: product.name.clone(),
            });
        }

        self.items.push(LineItem::from_product(product));
        Ok(())
    }

    /// Applies a signed delta to a line's quantity.
    ///
    /// Rejects without mutating if the result would drop below 1
    /// ([`CartError::QuantityBelowMinimum`]) or rise above the stock
    /// ceiling ([`CartError::StockLimitReached`]). Reaching 0 is never a
    /// removal; removal is explicit via [`Cart::remove_item`].
    pub fn adjust_quantity(&mut self, product_id: &str, delta: i64) -> CoreResult<()> {
        let line = self
            .items
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotInCart {
                product_id: product_id.to_string(),
            })?;

        let next = line.quantity + delta;
        if next < 1 {
            return Err(CartError::QuantityBelowMinimum);
        }
        if next > line.stock_ceiling {
            return Err(CartError::StockLimitReached {
                name: line.name.clone(),
                ceiling: line.stock_ceiling,
            });
        }

        line.quantity = next;
        Ok(())
    }

    /// Deletes a line item unconditionally.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|l| l.product_id != product_id);

        if self.items.len() == before {
            Err(CartError::ItemNotInCart {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Empties the ledger. Used after settlement or explicit operator
    /// confirmation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total amount due: sum of line totals, recomputed from current state.
    pub fn total(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// The current lines, in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up the line for a product, if present.
    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|l| l.product_id == product_id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Projects the lines for a checkout submission.
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items.iter().map(CheckoutLine::from).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
