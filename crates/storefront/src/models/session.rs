//! Session-related types.
//!
//! Types stored in the session for authentication state and the cart
//! slot.

use serde::{Deserialize, Serialize};

use arana_core::{Email, UserId};

/// Session-stored user identity.
///
/// Holds the bearer token the backend issued at login; order and receipt
/// calls are authenticated with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's backend ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Bearer token for the order service.
    pub token: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the persisted cart slot (a JSON array of line items,
    /// overwritten wholesale on every mutation).
    pub const CART: &str = "cart";

    /// Key for the checkout duplicate-submission marker.
    pub const CHECKOUT_STARTED_AT: &str = "checkout_started_at";
}
