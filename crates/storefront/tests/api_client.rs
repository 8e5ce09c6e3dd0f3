//! Tests for `ApiClient` against wiremock HTTP mocks.

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arana_core::{Cart, CheckoutRequest, LineItem, OrderId, OrderStatus, Price, ProductId};
use arana_storefront::api::{ApiClient, ApiError};
use arana_storefront::config::BackendConfig;

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(&BackendConfig {
        base_url: base_url.to_string(),
    })
}

fn sample_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add(LineItem {
        product_id: ProductId::new("A"),
        size: "M".to_owned(),
        quantity: 3,
        price: Price::from_rupees(1000),
        product_name: "Linen Shirt".to_owned(),
        image: "https://cdn.example.com/a.jpg".to_owned(),
    })
    .expect("valid line item");
    cart
}

#[tokio::test]
async fn create_order_sends_snapshot_and_parses_payment_fields() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "orderId": "ORD-2025-0001",
        "paymentData": {
            "merchant_id": "121XXXX",
            "order_id": "ORD-2025-0001",
            "amount": "3000.00",
            "currency": "LKR",
            "hash": "ABCDEF0123"
        }
    });

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer token-123"))
        .and(body_partial_json(serde_json::json!({ "totalAmount": "3000" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = CheckoutRequest::snapshot(&sample_cart());
    let created = client
        .create_order("token-123", &request)
        .await
        .expect("should create order");

    assert_eq!(created.order_id, OrderId::new("ORD-2025-0001"));
    assert_eq!(
        created.payment_data.get("currency").map(String::as_str),
        Some("LKR")
    );
    assert_eq!(created.payment_data.len(), 5);
}

#[tokio::test]
async fn create_order_surfaces_backend_rejection_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({ "message": "Insufficient stock for size M" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = CheckoutRequest::snapshot(&sample_cart());
    let err = client
        .create_order("token-123", &request)
        .await
        .expect_err("should reject");

    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Insufficient stock for size M");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_order_maps_401_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = CheckoutRequest::snapshot(&sample_cart());
    let err = client
        .create_order("expired", &request)
        .await
        .expect_err("should reject");

    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn get_order_parses_record() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "orderId": "ORD-2025-0001",
        "items": [{
            "productId": "A",
            "size": "M",
            "quantity": 3,
            "price": "1000",
            "productName": "Linen Shirt",
            "image": "https://cdn.example.com/a.jpg"
        }],
        "totalAmount": "3000",
        "status": "Paid",
        "createdAt": "2025-06-01T10:00:00Z",
        "paymentId": "PAY-777"
    });

    Mock::given(method("GET"))
        .and(path("/api/orders/ORD-2025-0001"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let order = client
        .get_order("token-123", &OrderId::new("ORD-2025-0001"))
        .await
        .expect("should parse order");

    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.total_amount, Price::from_rupees(3000));
    assert_eq!(order.items.len(), 1);
    assert!(order.payment_id.is_some());
}

#[tokio::test]
async fn get_order_maps_404_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/ORD-MISSING"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "message": "Order not found" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_order("token-123", &OrderId::new("ORD-MISSING"))
        .await
        .expect_err("should be missing");

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn get_product_caches_reads() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "_id": "A",
        "productName": "Linen Shirt",
        "Images": ["https://cdn.example.com/a.jpg"],
        "sizes": [{ "size": "M", "price": "1000", "stock": 4 }]
    });

    Mock::given(method("GET"))
        .and(path("/api/products/A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let first = client
        .get_product(&ProductId::new("A"))
        .await
        .expect("first fetch");
    let second = client
        .get_product(&ProductId::new("A"))
        .await
        .expect("cached fetch");

    assert_eq!(first, second);
    assert_eq!(first.size("M").map(|s| s.stock), Some(4));
}

#[tokio::test]
async fn send_receipt_email_posts_address() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders/ORD-1/send-email"))
        .and(body_partial_json(
            serde_json::json!({ "email": "user@example.com" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let email = "user@example.com".parse().expect("valid email");
    client
        .send_receipt_email("token-123", &OrderId::new("ORD-1"), &email)
        .await
        .expect("should ack");
}

#[tokio::test]
async fn fetch_receipt_pdf_returns_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/ORD-1/generate-pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 receipt".to_vec()),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let pdf = client
        .fetch_receipt_pdf("token-123", &OrderId::new("ORD-1"))
        .await
        .expect("should download");

    assert!(pdf.starts_with(b"%PDF"));
}
