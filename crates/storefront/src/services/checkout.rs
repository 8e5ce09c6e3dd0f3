//! Checkout coordination: turn the current cart into a priced order and
//! hand control to the payment processor.
//!
//! The hand-off is two-phase. Phase 1 ([`CheckoutCoordinator::prepare`])
//! creates the order and returns a [`RedirectDescriptor`] without any
//! navigation side effects. Phase 2 - rendering the descriptor as an
//! auto-submitting form - is the caller's explicit action, and the
//! resulting full-page POST to the processor is terminal: no application
//! code is guaranteed to run afterwards in that page context. All cart
//! mutation is therefore deferred to the return leg (see
//! [`super::orders`]); nothing is cleared optimistically here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tower_sessions::Session;
use tracing::{info, instrument};

use arana_core::{Cart, CheckoutRequest, OrderId};

use crate::api::{ApiClient, ApiError};
use crate::config::PaymentConfig;
use crate::models::session_keys;

/// How long a submission marker blocks duplicates before it is considered
/// abandoned (a crashed request must not wedge the session).
const IN_FLIGHT_STALE_SECS: i64 = 90;

/// Errors from checkout preparation.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// No session credential; the caller should redirect to login. The
    /// cart is left untouched.
    #[error("login required before checkout")]
    AuthRequired,

    /// An empty cart cannot be checked out.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Order creation failed; the cart is left untouched so the user can
    /// retry.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Everything needed to hand the browser to the payment processor: the
/// processor's checkout URL and the opaque server-issued form fields.
///
/// Building a descriptor performs no navigation; it is plain data that a
/// handler renders into an auto-submitting form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDescriptor {
    /// The order the processor will settle.
    pub order_id: OrderId,
    /// Processor checkout endpoint the form posts to.
    pub action_url: String,
    /// Hidden form fields, exactly as issued by the order service.
    pub fields: BTreeMap<String, String>,
}

/// Converts a cart into a server order and a payment redirect descriptor.
pub struct CheckoutCoordinator<'a> {
    api: &'a ApiClient,
    payment: &'a PaymentConfig,
}

impl<'a> CheckoutCoordinator<'a> {
    /// Create a coordinator over the backend client and processor config.
    #[must_use]
    pub const fn new(api: &'a ApiClient, payment: &'a PaymentConfig) -> Self {
        Self { api, payment }
    }

    /// Phase 1: submit the cart as an order and build the redirect
    /// descriptor.
    ///
    /// The request body is a snapshot: concurrent cart edits cannot alter
    /// a submission already in flight. On any failure the cart is
    /// untouched and the user can retry.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AuthRequired`] without a session credential
    /// - [`CheckoutError::EmptyCart`] before any network call
    /// - [`CheckoutError::Api`] when order creation fails
    #[instrument(skip(self, credential, cart), fields(items = cart.len()))]
    pub async fn prepare(
        &self,
        credential: Option<&str>,
        cart: &Cart,
    ) -> Result<RedirectDescriptor, CheckoutError> {
        let token = credential.ok_or(CheckoutError::AuthRequired)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = CheckoutRequest::snapshot(cart);
        let created = self.api.create_order(token, &request).await?;

        info!(
            order_id = %created.order_id,
            total = %request.total_amount,
            "Order created, handing off to payment processor"
        );

        Ok(RedirectDescriptor {
            order_id: created.order_id,
            action_url: self.payment.checkout_url.clone(),
            fields: created.payment_data,
        })
    }
}

// =============================================================================
// Duplicate-submission guard
// =============================================================================
//
// Submitting checkout twice before the first response returns must not
// create two orders. The guard is a session-scoped marker taken before
// the order-creation call and released when it completes; a second
// submission inside the window is rejected.

/// Try to take the submission marker for this session.
///
/// Returns `false` if another submission is already in flight (and not
/// stale), in which case the caller must reject with 409 and make no
/// order-creation call.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn begin_submission(session: &Session) -> Result<bool, tower_sessions::session::Error> {
    let now = Utc::now();

    if let Some(started) = session
        .get::<DateTime<Utc>>(session_keys::CHECKOUT_STARTED_AT)
        .await?
        && !is_stale(started, now)
    {
        return Ok(false);
    }

    session
        .insert(session_keys::CHECKOUT_STARTED_AT, now)
        .await?;
    Ok(true)
}

/// Release the submission marker once the order-creation call completes,
/// whether it succeeded or failed.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn end_submission(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<DateTime<Utc>>(session_keys::CHECKOUT_STARTED_AT)
        .await?;
    Ok(())
}

/// A marker older than the staleness bound no longer blocks submissions.
fn is_stale(started: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(started) >= chrono::Duration::seconds(IN_FLIGHT_STALE_SECS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_marker_blocks() {
        let now = Utc::now();
        assert!(!is_stale(now, now));
        assert!(!is_stale(now, now + chrono::Duration::seconds(89)));
    }

    #[test]
    fn test_stale_marker_no_longer_blocks() {
        let now = Utc::now();
        assert!(is_stale(now, now + chrono::Duration::seconds(90)));
        assert!(is_stale(now, now + chrono::Duration::seconds(600)));
    }
}
