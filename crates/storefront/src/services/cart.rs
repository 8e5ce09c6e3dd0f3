//! The cart store: the pure ledger from `arana-core` behind an injected
//! persistence capability.
//!
//! Every mutation loads the current cart, applies the pure operation, and
//! overwrites the persisted slot wholesale. A failed save propagates and
//! the persisted state is unchanged, so mutations are all-or-nothing
//! relative to persistence. The slot is scoped to the browsing session;
//! concurrent tabs race last-writer-wins, which is accepted.

use tower_sessions::Session;
use tracing::{instrument, warn};

use arana_core::{Cart, CartError, LineItem, LineItemKey, Price};

use crate::models::session_keys;

/// Errors from the persistence capability.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The underlying session store failed.
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),

    /// The persisted blob did not deserialize as a cart.
    #[error("corrupt cart payload: {0}")]
    Corrupt(String),
}

/// Errors from cart store operations.
#[derive(Debug, thiserror::Error)]
pub enum CartStoreError {
    /// The pure ledger rejected the mutation.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The persisted slot could not be written.
    #[error("cart persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Capability interface for the single persisted cart slot.
///
/// Production uses [`SessionCart`]; tests substitute [`InMemoryCart`].
pub trait CartPersistence {
    /// Load the persisted cart, `None` if the slot is empty.
    fn load(&self) -> impl Future<Output = Result<Option<Cart>, PersistenceError>> + Send;

    /// Overwrite the slot with the given cart.
    fn save(&self, cart: &Cart) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// The authoritative local cart with its persisted representation.
#[derive(Debug, Clone)]
pub struct CartStore<P> {
    persistence: P,
}

impl<P: CartPersistence> CartStore<P> {
    /// Create a store over the given persistence backend.
    pub const fn new(persistence: P) -> Self {
        Self { persistence }
    }

    /// The current cart.
    ///
    /// An empty or unreadable slot degrades to an empty cart with a
    /// warning; this never raises to the caller.
    pub async fn get(&self) -> Cart {
        match self.persistence.load().await {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!("Discarding unreadable cart slot: {e}");
                Cart::new()
            }
        }
    }

    /// Add an item, merging with an existing entry of the same
    /// `(product, size)` identity, and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger rejects the item or the save fails;
    /// the persisted cart is unchanged in either case.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, size = %item.size))]
    pub async fn add(&self, item: LineItem) -> Result<Cart, CartStoreError> {
        let mut cart = self.get().await;
        cart.add(item)?;
        self.persistence.save(&cart).await?;
        Ok(cart)
    }

    /// Replace the quantity of an existing line item and persist.
    ///
    /// # Errors
    ///
    /// Rejects quantities below one (entry unchanged, not clamped) and
    /// unknown keys; a failed save leaves the persisted cart unchanged.
    #[instrument(skip(self, key), fields(product_id = %key.product_id, size = %key.size))]
    pub async fn set_quantity(
        &self,
        key: &LineItemKey,
        quantity: u32,
    ) -> Result<Cart, CartStoreError> {
        let mut cart = self.get().await;
        cart.set_quantity(key, quantity)?;
        self.persistence.save(&cart).await?;
        Ok(cart)
    }

    /// Remove a line item and persist. An absent key is a no-op (the slot
    /// is not rewritten).
    ///
    /// # Errors
    ///
    /// Returns an error only if the save fails.
    #[instrument(skip(self, key), fields(product_id = %key.product_id, size = %key.size))]
    pub async fn remove(&self, key: &LineItemKey) -> Result<Cart, CartStoreError> {
        let mut cart = self.get().await;
        if cart.remove(key) {
            self.persistence.save(&cart).await?;
        }
        Ok(cart)
    }

    /// `Σ price × quantity` over the current cart.
    pub async fn total(&self) -> Price {
        self.get().await.total()
    }

    /// Empty the cart and persist.
    ///
    /// Used only after confirmed payment, or on explicit user action.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartStoreError> {
        self.persistence.save(&Cart::new()).await?;
        Ok(())
    }
}

// =============================================================================
// Persistence backends
// =============================================================================

/// Session-backed persistence: one named slot in the tower-sessions
/// session, overwritten wholesale on every mutation.
#[derive(Debug, Clone)]
pub struct SessionCart {
    session: Session,
}

impl SessionCart {
    /// Wrap the request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartPersistence for SessionCart {
    async fn load(&self) -> Result<Option<Cart>, PersistenceError> {
        match self.session.get::<Cart>(session_keys::CART).await {
            Ok(cart) => Ok(cart),
            // A payload that no longer deserializes (schema drift, manual
            // tampering) is corrupt, not fatal.
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                Err(PersistenceError::Corrupt(e.to_string()))
            }
            Err(e) => Err(PersistenceError::Store(e)),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), PersistenceError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }
}

/// In-memory persistence for tests.
#[derive(Debug, Default)]
pub struct InMemoryCart {
    slot: std::sync::Mutex<Option<Cart>>,
}

impl InMemoryCart {
    /// An empty in-memory slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartPersistence for InMemoryCart {
    async fn load(&self) -> Result<Option<Cart>, PersistenceError> {
        Ok(self
            .slot
            .lock()
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?
            .clone())
    }

    async fn save(&self, cart: &Cart) -> Result<(), PersistenceError> {
        *self
            .slot
            .lock()
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))? = Some(cart.clone());
        Ok(())
    }
}
