//! # Error Types
//!
//! Domain errors for the cart ledger.
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in every message (product name, ceiling, id)
//! 3. Rejections are return values the surfaces can render inline;
//!    a rejected operation never leaves the cart partially mutated

use thiserror::Error;

/// Cart ledger rejections.
///
/// Every variant is recoverable: the operation is refused, the cart is
/// unchanged, and the operator keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Product had zero stock at add time; no line item is created.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// Add/adjust would push the quantity past the stock ceiling captured
    /// at add time.
    #[error("{name}: only {ceiling} in stock")]
    StockLimitReached { name: String, ceiling: i64 },

    /// Adjust would drop the quantity below 1. Removal is explicit,
    /// never a side effect of adjusting.
    #[error("quantity cannot go below 1; remove the item instead")]
    QuantityBelowMinimum,

    /// Adjust/remove addressed a product that has no line in the cart.
    #[error("product {product_id} is not in the cart")]
    ItemNotInCart { product_id: String },
}

/// Convenience type alias for Results with CartError.
pub type CoreResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
