//! Order status resolution: establish the true order status after the
//! processor hands control back, and reconcile the local cart.

use tracing::{info, instrument};

use arana_core::{Order, OrderId};

use crate::api::{ApiClient, ApiError};

use super::cart::{CartPersistence, CartStore, CartStoreError};

/// Errors from order resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No session credential; the caller should redirect to login.
    #[error("login required to view this order")]
    AuthRequired,

    /// The order record could not be fetched (network error, unknown id).
    /// The cart is not mutated.
    #[error("could not load order: {0}")]
    Lookup(#[source] ApiError),

    /// Clearing the cart after a confirmed payment failed.
    #[error(transparent)]
    Cart(#[from] CartStoreError),
}

/// Outcome of a reconciliation: the authoritative order record plus
/// whether this resolution actually cleared the cart.
#[derive(Debug)]
pub struct Reconciliation {
    pub order: Order,
    pub cart_cleared: bool,
}

/// Fetches the authoritative order record and reconciles the local cart.
pub struct OrderStatusResolver<'a, P> {
    api: &'a ApiClient,
    cart: &'a CartStore<P>,
}

impl<'a, P: CartPersistence> OrderStatusResolver<'a, P> {
    /// Create a resolver over the backend client and the session's cart
    /// store.
    #[must_use]
    pub const fn new(api: &'a ApiClient, cart: &'a CartStore<P>) -> Self {
        Self { api, cart }
    }

    /// Fetch the order and reconcile local state.
    ///
    /// Once the order reports paid, the cart is cleared. Re-resolving an
    /// already-cleared cart is a safe no-op (`cart_cleared` is false the
    /// second time). `Pending`/`Failed`/`Cancelled` leave the cart intact
    /// so the user can retry checkout; the status is surfaced for
    /// display.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::AuthRequired`] without a session credential
    /// - [`ResolveError::Lookup`] when the fetch fails; the cart is not
    ///   mutated
    /// - [`ResolveError::Cart`] when the post-payment clear fails
    #[instrument(skip(self, credential), fields(order_id = %order_id))]
    pub async fn resolve(
        &self,
        credential: Option<&str>,
        order_id: &OrderId,
    ) -> Result<Reconciliation, ResolveError> {
        let token = credential.ok_or(ResolveError::AuthRequired)?;

        let order = self
            .api
            .get_order(token, order_id)
            .await
            .map_err(ResolveError::Lookup)?;

        let mut cart_cleared = false;
        if order.status.is_paid() && !self.cart.get().await.is_empty() {
            self.cart.clear().await?;
            cart_cleared = true;
            info!(order_id = %order.order_id, "Payment confirmed, cart cleared");
        }

        Ok(Reconciliation {
            order,
            cart_cleared,
        })
    }
}
