//! # Dual-Surface Presentation
//!
//! The desktop sidebar cart and the mobile cart modal are two views over
//! one session. Neither holds state of its own: both receive the same
//! [`SessionSnapshot`] through a watch channel, so a read that follows a
//! mutation always observes that mutation, on both surfaces, in the same
//! order.
//!
//! Opening or closing the modal never touches the cart; opening it resets
//! the payment snapshot (a modal closed mid-payment-entry reopens clean).

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use ts_rs::TS;

use till_core::{LineItem, Money, PaymentView};

use crate::checkout::CheckoutPhase;

// =============================================================================
// Session Snapshot
// =============================================================================

/// Everything a surface renders, derived from the ledger on every mutation.
///
/// No field here is a second copy of truth: `items` and `total` come from
/// the cart, `payment` is recomputed against the current total, and the
/// snapshot as a whole is replaced wholesale on each publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub items: Vec<LineItem>,
    pub total: Money,
    pub payment: PaymentView,
    pub phase: CheckoutPhase,
    /// Human-readable reason for the last failed or refused checkout.
    pub last_error: Option<String>,
    /// Whether the mobile cart modal is open.
    pub modal_open: bool,
}

// =============================================================================
// Surface Handle
// =============================================================================

/// A surface's subscription to the session.
///
/// Cheap to clone; every clone observes the same sequence of snapshots.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SurfaceHandle {
    pub(crate) fn new(rx: watch::Receiver<SessionSnapshot>) -> Self {
        SurfaceHandle { rx }
    }

    /// The latest published snapshot.
    pub fn current(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// Waits for the next publish and returns it. Returns the latest
    /// snapshot immediately if the session has been dropped.
    pub async fn changed(&mut self) -> SessionSnapshot {
        let _ = self.rx.changed().await;
        self.rx.borrow_and_update().clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
