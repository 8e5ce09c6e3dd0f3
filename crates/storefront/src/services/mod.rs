//! Domain services for the storefront.
//!
//! - [`cart`] - The cart store: pure ledger + injected persistence
//! - [`checkout`] - Order submission and the payment redirect descriptor
//! - [`orders`] - Post-payment reconciliation of the local cart

pub mod cart;
pub mod checkout;
pub mod orders;

pub use cart::{CartPersistence, CartStore, CartStoreError, InMemoryCart, SessionCart};
pub use checkout::{CheckoutCoordinator, CheckoutError, RedirectDescriptor};
pub use orders::{OrderStatusResolver, Reconciliation, ResolveError};
