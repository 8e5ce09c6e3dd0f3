//! The cart ledger: an ordered collection of line items with
//! merge-by-identity semantics.
//!
//! A line item's identity is `(product_id, size)`. Re-adding an existing
//! identity grows its quantity; it never creates a second entry and never
//! rewrites the price captured at first add. Display order is insertion
//! order; totals are order-independent.
//!
//! This module is pure. Persistence (the single session slot the cart is
//! written to wholesale) is the storefront's concern.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Quantities below one are rejected, never clamped.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The addressed line item is not in the cart.
    #[error("no line item for product {product_id} in size {size}")]
    UnknownItem {
        /// Product whose line item was addressed.
        product_id: ProductId,
        /// Size variant that was addressed.
        size: String,
    },
}

/// Identity key of a line item: one entry per product and size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemKey {
    pub product_id: ProductId,
    pub size: String,
}

impl LineItemKey {
    /// Create a key from a product and size.
    #[must_use]
    pub fn new(product_id: ProductId, size: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
        }
    }
}

/// One cart entry, identified by product and size.
///
/// `price`, `product_name`, and `image` are captured from the product
/// record when the item is first added and are immutable afterwards; only
/// `quantity` changes. Wire encoding is camelCase to match the order
/// service's JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    pub price: Price,
    pub product_name: String,
    pub image: String,
}

impl LineItem {
    /// The identity key of this line item.
    #[must_use]
    pub fn key(&self) -> LineItemKey {
        LineItemKey::new(self.product_id.clone(), self.size.clone())
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The cart: an insertion-ordered list of line items, at most one per
/// identity key.
///
/// Serializes transparently as a JSON array, which is also the shape of
/// the persisted slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The line items in display (insertion) order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total unit count across all line items (for the cart badge).
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Add an item, merging with an existing entry of the same identity.
    ///
    /// A matching entry has its quantity grown by `item.quantity`; the
    /// stored price/name/image stay as first captured. Otherwise the item
    /// is appended. Stock bounds are the product page's concern at
    /// selection time, not the ledger's.
    ///
    /// # Errors
    ///
    /// Rejects a zero quantity with [`CartError::InvalidQuantity`].
    pub fn add(&mut self, item: LineItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(existing) = self.find_mut(&item.key()) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Replace the quantity of an existing line item.
    ///
    /// # Errors
    ///
    /// Rejects zero with [`CartError::InvalidQuantity`] (the entry is left
    /// unchanged, not clamped) and an absent key with
    /// [`CartError::UnknownItem`].
    pub fn set_quantity(&mut self, key: &LineItemKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let item = self.find_mut(key).ok_or_else(|| CartError::UnknownItem {
            product_id: key.product_id.clone(),
            size: key.size.clone(),
        })?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove the line item with the given key.
    ///
    /// Returns whether anything was removed; an absent key is a no-op,
    /// not an error.
    pub fn remove(&mut self, key: &LineItemKey) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != *key);
        self.items.len() != before
    }

    /// `Σ price × quantity` over all entries.
    ///
    /// Deterministic and stable across reorderings.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn find_mut(&mut self, key: &LineItemKey) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.key() == *key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(product_id: &str, size: &str, quantity: u32, rupees: i64) -> LineItem {
        LineItem {
            product_id: ProductId::new(product_id),
            size: size.to_owned(),
            quantity,
            price: Price::from_rupees(rupees),
            product_name: format!("Product {product_id}"),
            image: format!("https://cdn.example.com/{product_id}.jpg"),
        }
    }

    #[test]
    fn test_add_merges_same_identity() {
        let mut cart = Cart::new();
        cart.add(item("A", "M", 2, 1000)).unwrap();
        cart.add(item("A", "M", 1, 1000)).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), Price::from_rupees(3000));
    }

    #[test]
    fn test_add_keeps_first_captured_price() {
        let mut cart = Cart::new();
        cart.add(item("A", "M", 1, 1000)).unwrap();
        // A later add with a drifted price only grows the quantity.
        cart.add(item("A", "M", 1, 1200)).unwrap();

        assert_eq!(cart.items()[0].price, Price::from_rupees(1000));
        assert_eq!(cart.total(), Price::from_rupees(2000));
    }

    #[test]
    fn test_different_sizes_are_distinct_entries() {
        let mut cart = Cart::new();
        cart.add(item("A", "M", 1, 1000)).unwrap();
        cart.add(item("A", "L", 1, 1100)).unwrap();

        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(item("A", "M", 0, 1000)),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_is_order_independent() {
        let entries = [
            item("A", "M", 2, 1000),
            item("B", "S", 1, 2500),
            item("C", "L", 3, 750),
        ];

        let mut forward = Cart::new();
        for entry in entries.clone() {
            forward.add(entry).unwrap();
        }

        let mut reversed = Cart::new();
        for entry in entries.into_iter().rev() {
            reversed.add(entry).unwrap();
        }

        assert_eq!(forward.total(), reversed.total());
        assert_eq!(forward.total(), Price::from_rupees(2000 + 2500 + 2250));
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut cart = Cart::new();
        cart.add(item("A", "M", 2, 1000)).unwrap();

        cart.set_quantity(&LineItemKey::new(ProductId::new("A"), "M"), 5)
            .unwrap();
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_set_quantity_zero_leaves_entry_unchanged() {
        let mut cart = Cart::new();
        cart.add(item("A", "M", 2, 1000)).unwrap();

        let err = cart
            .set_quantity(&LineItemKey::new(ProductId::new("A"), "M"), 0)
            .unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_set_quantity_unknown_key() {
        let mut cart = Cart::new();
        let err = cart
            .set_quantity(&LineItemKey::new(ProductId::new("A"), "M"), 1)
            .unwrap_err();
        assert!(matches!(err, CartError::UnknownItem { .. }));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add(item("A", "M", 2, 1000)).unwrap();

        let key = LineItemKey::new(ProductId::new("A"), "M");
        assert!(cart.remove(&key));
        assert!(!cart.remove(&key));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unit_count() {
        let mut cart = Cart::new();
        cart.add(item("A", "M", 2, 1000)).unwrap();
        cart.add(item("B", "S", 3, 500)).unwrap();
        assert_eq!(cart.unit_count(), 5);
    }

    #[test]
    fn test_serde_matches_persisted_shape() {
        // The persisted slot is a bare JSON array of camelCase items.
        let mut cart = Cart::new();
        cart.add(item("A", "M", 2, 1000)).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["productId"], "A");
        assert_eq!(entries[0]["productName"], "Product A");
        assert_eq!(entries[0]["quantity"], 2);

        let parsed: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, cart);
    }
}
