//! # till-client: Remote Order/Catalog Service Boundary
//!
//! The checkout engine treats the catalog and order service as a single
//! remote collaborator behind the [`PosBackend`] trait:
//!
//! - `GET products?search=&category=` - the sellable catalog
//! - `GET products/scan/{code}` - single-product lookup by barcode
//! - `GET categories` - browse filters
//! - `POST transactions` - settle a finished sale
//!
//! [`HttpBackend`] is the production implementation over reqwest. Tests in
//! `till-session` swap in an in-memory fake; nothing above this crate knows
//! which one it is talking to.

pub mod backend;
pub mod error;
pub mod http;

pub use backend::{PosBackend, ProductFilter, TransactionReceipt};
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
