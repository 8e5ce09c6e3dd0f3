//! Order status as reported by the order service.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// All transitions are server-authoritative; the storefront only observes.
/// The server moves `Pending` to one of `Paid`/`Failed`/`Cancelled` after
/// the payment processor reports back, and `Paid` to `Delivered` on
/// fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Cancelled,
    Delivered,
}

impl OrderStatus {
    /// Whether payment has been confirmed (including later fulfillment).
    ///
    /// The local cart is cleared only once this holds.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid | Self::Delivered)
    }

    /// Whether checkout can still be retried from the current cart.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Pending | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Delivered => "Delivered",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_server_casing() {
        // The order service stores statuses capitalized ("Paid", not "paid").
        let json = serde_json::to_string(&OrderStatus::Paid).unwrap();
        assert_eq!(json, "\"Paid\"");

        let parsed: OrderStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_is_paid() {
        assert!(OrderStatus::Paid.is_paid());
        assert!(OrderStatus::Delivered.is_paid());
        assert!(!OrderStatus::Pending.is_paid());
        assert!(!OrderStatus::Failed.is_paid());
    }

    #[test]
    fn test_retryable_statuses_leave_cart_usable() {
        assert!(OrderStatus::Pending.is_retryable());
        assert!(OrderStatus::Failed.is_retryable());
        assert!(OrderStatus::Cancelled.is_retryable());
        assert!(!OrderStatus::Paid.is_retryable());
        assert!(!OrderStatus::Delivered.is_retryable());
    }
}
