//! # till-core: Pure Business Logic for the Checkout Engine
//!
//! This crate holds the rules of the sale: what may enter the cart, how
//! quantities move against their stock ceilings, and how tendered money
//! resolves into change. It is deliberately free of I/O - the catalog and
//! the order service live behind `till-client`, and all mutable session
//! state lives in `till-session`.
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents money type (no floating point!)
//! - [`types`] - Domain types (Product, TenderType, CheckoutRequest, ...)
//! - [`error`] - Domain error types
//! - [`cart`] - The cart ledger: line items and stock-ceiling enforcement
//! - [`payment`] - The payment calculator: tender, sufficiency, change
//!
//! ## Design Principles
//!
//! 1. **Pure state machines**: every mutation is synchronous and
//!    all-or-nothing - a rejected operation leaves state untouched
//! 2. **Integer money**: all monetary values are cents (i64)
//! 3. **Explicit errors**: rejections are typed enum variants returned as
//!    values, never panics, so the surfaces can show "Out of stock" /
//!    "Max reached" without interrupting flow

pub mod cart;
pub mod error;
pub mod money;
pub mod payment;
pub mod types;

pub use cart::{Cart, LineItem};
pub use error::{CartError, CoreResult};
pub use money::Money;
pub use payment::{PaymentState, PaymentView};
pub use types::*;
