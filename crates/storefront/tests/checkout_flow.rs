//! End-to-end checkout and reconciliation flow against wiremock mocks.
//!
//! Drives the cart store, the checkout coordinator, and the order status
//! resolver together the way the route handlers do, without a running
//! server.

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arana_core::{LineItem, OrderId, OrderStatus, Price, ProductId};
use arana_storefront::api::ApiClient;
use arana_storefront::config::{BackendConfig, PaymentConfig};
use arana_storefront::services::cart::{CartStore, InMemoryCart};
use arana_storefront::services::checkout::{CheckoutCoordinator, CheckoutError};
use arana_storefront::services::orders::{OrderStatusResolver, ResolveError};

const CHECKOUT_URL: &str = "https://sandbox.payhere.lk/pay/checkout";

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(&BackendConfig {
        base_url: base_url.to_string(),
    })
}

fn payment_config() -> PaymentConfig {
    PaymentConfig {
        checkout_url: CHECKOUT_URL.to_string(),
    }
}

fn line_item(quantity: u32) -> LineItem {
    LineItem {
        product_id: ProductId::new("A"),
        size: "M".to_owned(),
        quantity,
        price: Price::from_rupees(1000),
        product_name: "Linen Shirt".to_owned(),
        image: "https://cdn.example.com/a.jpg".to_owned(),
    }
}

fn order_body(status: &str) -> serde_json::Value {
    serde_json::json!({
        "orderId": "ORD-1",
        "items": [{
            "productId": "A",
            "size": "M",
            "quantity": 3,
            "price": "1000",
            "productName": "Linen Shirt",
            "image": "https://cdn.example.com/a.jpg"
        }],
        "totalAmount": "3000",
        "status": status,
        "createdAt": "2025-06-01T10:00:00Z"
    })
}

/// The full happy path: merge-add, submit with the exact total, redirect
/// descriptor, then resolve `Paid` and find the cart cleared.
#[tokio::test]
async fn checkout_then_paid_resolution_clears_cart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_partial_json(serde_json::json!({ "totalAmount": "3000" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "orderId": "ORD-1",
            "paymentData": {
                "merchant_id": "121XXXX",
                "amount": "3000.00",
                "currency": "LKR"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/orders/ORD-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body("Paid")))
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let store = CartStore::new(InMemoryCart::new());

    // cart = [{A,"M",2,1000}]; add({A,"M",1,1000}) -> one entry, qty 3
    store.add(line_item(2)).await.expect("first add");
    let cart = store.add(line_item(1)).await.expect("merge add");
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.items()[0].quantity, 3);
    assert_eq!(cart.total(), Price::from_rupees(3000));

    // Phase 1: order created, descriptor built, no cart mutation.
    let payment = payment_config();
    let coordinator = CheckoutCoordinator::new(&api, &payment);
    let descriptor = coordinator
        .prepare(Some("token-123"), &cart)
        .await
        .expect("order should be created");

    assert_eq!(descriptor.order_id, OrderId::new("ORD-1"));
    assert_eq!(descriptor.action_url, CHECKOUT_URL);
    assert_eq!(
        descriptor.fields.get("merchant_id").map(String::as_str),
        Some("121XXXX")
    );
    assert_eq!(store.get().await.len(), 1, "cart untouched before return leg");

    // Return leg: resolve the order; Paid clears the cart exactly once.
    let resolver = OrderStatusResolver::new(&api, &store);
    let first = resolver
        .resolve(Some("token-123"), &OrderId::new("ORD-1"))
        .await
        .expect("resolution should succeed");
    assert_eq!(first.order.status, OrderStatus::Paid);
    assert!(first.cart_cleared);
    assert!(store.get().await.is_empty());

    // Re-resolving an already-cleared cart is a safe no-op.
    let second = resolver
        .resolve(Some("token-123"), &OrderId::new("ORD-1"))
        .await
        .expect("second resolution should succeed");
    assert!(!second.cart_cleared);
    assert!(store.get().await.is_empty());
}

/// No token: both submit and resolve fail with the auth condition and the
/// cart is untouched. No request reaches the backend.
#[tokio::test]
async fn missing_credential_is_rejected_before_any_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let store = CartStore::new(InMemoryCart::new());
    store.add(line_item(3)).await.expect("add");

    let payment = payment_config();
    let coordinator = CheckoutCoordinator::new(&api, &payment);
    let err = coordinator
        .prepare(None, &store.get().await)
        .await
        .expect_err("must require auth");
    assert!(matches!(err, CheckoutError::AuthRequired));

    let resolver = OrderStatusResolver::new(&api, &store);
    let err = resolver
        .resolve(None, &OrderId::new("ORD-1"))
        .await
        .expect_err("must require auth");
    assert!(matches!(err, ResolveError::AuthRequired));

    let cart = store.get().await;
    assert_eq!(cart.items()[0].quantity, 3, "cart untouched");
}

/// Order creation failure leaves the cart unchanged so the user can
/// retry.
#[tokio::test]
async fn failed_order_creation_leaves_cart_intact() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "message": "database down" })),
        )
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let store = CartStore::new(InMemoryCart::new());
    store.add(line_item(2)).await.expect("add");

    let payment = payment_config();
    let coordinator = CheckoutCoordinator::new(&api, &payment);
    let err = coordinator
        .prepare(Some("token-123"), &store.get().await)
        .await
        .expect_err("should fail");
    assert!(matches!(err, CheckoutError::Api(_)));

    assert_eq!(store.get().await.items()[0].quantity, 2);
}

/// An empty cart is rejected before any network call.
#[tokio::test]
async fn empty_cart_is_rejected_without_network_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let payment = payment_config();
    let coordinator = CheckoutCoordinator::new(&api, &payment);

    let err = coordinator
        .prepare(Some("token-123"), &arana_core::Cart::new())
        .await
        .expect_err("empty cart must be rejected");
    assert!(matches!(err, CheckoutError::EmptyCart));
}

/// Non-paid statuses leave the cart intact for retry.
#[tokio::test]
async fn pending_and_cancelled_leave_cart_intact() {
    for status in ["Pending", "Failed", "Cancelled"] {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/orders/ORD-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_body(status)))
            .mount(&server)
            .await;

        let api = test_client(&server.uri());
        let store = CartStore::new(InMemoryCart::new());
        store.add(line_item(3)).await.expect("add");

        let resolver = OrderStatusResolver::new(&api, &store);
        let reconciliation = resolver
            .resolve(Some("token-123"), &OrderId::new("ORD-1"))
            .await
            .expect("resolution should succeed");

        assert!(!reconciliation.cart_cleared, "status {status}");
        assert!(reconciliation.order.status.is_retryable());
        assert_eq!(store.get().await.len(), 1, "status {status}");
    }
}

/// A fetch failure is a lookup condition, distinct from auth, and does
/// not mutate the cart.
#[tokio::test]
async fn lookup_failure_does_not_mutate_cart() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/ORD-GONE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            serde_json::json!({ "message": "Order not found" }),
        ))
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let store = CartStore::new(InMemoryCart::new());
    store.add(line_item(1)).await.expect("add");

    let resolver = OrderStatusResolver::new(&api, &store);
    let err = resolver
        .resolve(Some("token-123"), &OrderId::new("ORD-GONE"))
        .await
        .expect_err("should fail lookup");

    assert!(matches!(err, ResolveError::Lookup(_)));
    assert_eq!(store.get().await.len(), 1);
}
