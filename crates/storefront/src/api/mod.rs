//! REST client for the shop's order/product backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products and orders - NO local
//!   sync, direct API calls
//! - Plain JSON over HTTP, bearer-token authenticated per call where the
//!   endpoint requires a logged-in customer
//! - In-memory caching via `moka` for product reads (5 minute TTL); cart
//!   and order calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use arana_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.backend);
//!
//! // Fetch a product
//! let product = api.get_product(&ProductId::new("66b2f1c4a8")).await?;
//!
//! // Create an order from the current cart snapshot
//! let created = api.create_order(token, &CheckoutRequest::snapshot(&cart)).await?;
//! ```

mod orders;
mod products;
pub mod types;

pub use types::{LoginResponse, OrderCreated, Product, ProductSize};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::BackendConfig;

/// Product cache time-to-live.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors that can occur when talking to the shop backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, DNS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request with an error body.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The bearer token was missing or rejected by the backend.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether this failure is worth surfacing with a retry affordance.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// Client for the shop's order/product REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    product_cache: Cache<String, types::Product>,
}

impl ApiClient {
    /// Create a new backend API client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                product_cache,
            }),
        }
    }

    /// The configured backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    pub(crate) fn product_cache(&self) -> &Cache<String, types::Product> {
        &self.inner.product_cache
    }

    /// Triage a response: map auth/not-found/error statuses, then parse
    /// the JSON body.
    pub(crate) async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }

        if status == StatusCode::NOT_FOUND {
            let message = error_message(response).await;
            return Err(ApiError::NotFound(message));
        }

        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Read as text first for better parse diagnostics
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e.to_string())
        })
    }

    /// Like [`Self::read_json`] but discards the response body.
    pub(crate) async fn read_ack(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Extract the backend's `{"message": ...}` error body, falling back to
/// raw text.
async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<types::ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("order ORD-1".to_string());
        assert_eq!(err.to_string(), "Not found: order ORD-1");

        let err = ApiError::Api {
            status: 422,
            message: "items cannot be empty".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 422 - items cannot be empty");
    }

    #[test]
    fn test_transient_classification() {
        assert!(!ApiError::Unauthorized.is_transient());
        assert!(
            !ApiError::Api {
                status: 500,
                message: String::new()
            }
            .is_transient()
        );
    }
}
