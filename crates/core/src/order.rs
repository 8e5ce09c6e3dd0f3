//! Server-owned order records and the checkout snapshot.
//!
//! The storefront never writes order fields: it triggers creation via the
//! order service and re-reads the record afterwards to reconcile local
//! state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, LineItem};
use crate::types::{OrderId, OrderStatus, PaymentId, Price};

/// The body of an order-creation request.
///
/// A snapshot, not a reference: it owns its items, so later cart
/// mutations cannot change a submission already in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<LineItem>,
    pub total_amount: Price,
}

impl CheckoutRequest {
    /// Snapshot the current cart into an immutable request.
    #[must_use]
    pub fn snapshot(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_amount: cart.total(),
        }
    }
}

/// An order record as returned by `GET /api/orders/:orderId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub items: Vec<LineItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
}
