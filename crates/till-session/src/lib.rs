//! # till-session: Stateful Checkout Engine
//!
//! Ties the pure logic of `till-core` to the service boundary of
//! `till-client` for one operator session.
//!
//! ```text
//!  scan / browse ──► ScanResolver ─┐
//!                                  ▼
//!  CatalogCache ◄── refresh ── PosSession ── submit ──► PosBackend
//!  (read-only to the cart)        │  owns Cart + PaymentState + phase
//!                                 ▼
//!                       watch::Sender<SessionSnapshot>
//!                        │                    │
//!                 desktop sidebar        mobile cart modal
//! ```
//!
//! ## Concurrency Model
//! All cart and payment mutations are synchronous under one mutex and
//! publish a fresh snapshot before returning, so any read that follows a
//! mutation observes it. Awaits happen only at the I/O edges: catalog
//! refresh (last-request-wins), scan fallback, and the single in-flight
//! transaction submission.
//!
//! ## Modules
//! - [`catalog`] - last-fetched product/category set, lookup by id and scan code
//! - [`scan`] - decoded barcode -> catalog entry, with remote fallback
//! - [`checkout`] - checkout phase machine, guards, request building
//! - [`session`] - the shared store both surfaces operate on
//! - [`surface`] - published snapshot type and surface subscriptions
//! - [`error`] - checkout error taxonomy

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod scan;
pub mod session;
pub mod surface;

#[cfg(test)]
pub(crate) mod fake;

pub use catalog::CatalogCache;
pub use checkout::CheckoutPhase;
pub use error::{CheckoutError, SessionError};
pub use scan::{Resolution, ScanResolver};
pub use session::{PosSession, ScanOutcome};
pub use surface::{SessionSnapshot, SurfaceHandle};
