//! Wire types for the shop backend API.
//!
//! Field names follow the backend's camelCase JSON. `Order`,
//! `CheckoutRequest`, and `LineItem` live in `arana-core` since both the
//! ledger and the wire share them; the types here exist only at the REST
//! boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use arana_core::{Email, OrderId, Price, ProductId, UserId};

/// One size variant of a product, with its price and remaining stock.
///
/// The stock figure is the bound the product page enforces at selection
/// time; the cart ledger itself does not re-check it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSize {
    pub size: String,
    pub price: Price,
    pub stock: u32,
}

/// A product record from `GET /api/products/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    // The backend capitalizes this one field.
    #[serde(rename = "Images", default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<ProductSize>,
}

impl Product {
    /// Look up a size variant by its label.
    #[must_use]
    pub fn size(&self, size: &str) -> Option<&ProductSize> {
        self.sizes.iter().find(|s| s.size == size)
    }

    /// First product image, if any (used as the cart thumbnail).
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Response of `POST /api/orders`: the new order id plus the opaque
/// processor form fields.
///
/// `payment_data` is a processor-defined key/value map; a `BTreeMap`
/// keeps the rendered form deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub payment_data: BTreeMap<String, String>,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
    pub email: Email,
}

/// Request body for `POST /api/orders/:orderId/send-email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub email: Email,
}

/// The backend's error body shape.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_backend_shape() {
        let json = serde_json::json!({
            "_id": "66b2f1c4a8",
            "productName": "Linen Shirt",
            "description": "Handloom linen.",
            "Images": ["https://cdn.example.com/a.jpg"],
            "sizes": [
                { "size": "M", "price": "1000", "stock": 4 },
                { "size": "L", "price": "1100", "stock": 0 }
            ]
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.product_name, "Linen Shirt");
        assert_eq!(product.size("M").unwrap().stock, 4);
        assert!(product.size("XL").is_none());
        assert_eq!(product.primary_image(), Some("https://cdn.example.com/a.jpg"));
    }

    #[test]
    fn test_order_created_field_order_is_deterministic() {
        let json = serde_json::json!({
            "orderId": "ORD-1",
            "paymentData": {
                "merchant_id": "121XXXX",
                "amount": "3000.00",
                "currency": "LKR"
            }
        });

        let created: OrderCreated = serde_json::from_value(json).unwrap();
        let keys: Vec<&str> = created.payment_data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["amount", "currency", "merchant_id"]);
    }
}
