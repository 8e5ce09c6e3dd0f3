//! Order endpoints (never cached - mutable state) and login glue.

use tracing::instrument;

use arana_core::{CheckoutRequest, Email, Order, OrderId};

use super::{
    ApiClient, ApiError,
    types::{LoginResponse, OrderCreated, SendEmailRequest},
};

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// Token issuance itself is the backend's; the storefront only stores
    /// the result in the session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or another
    /// error if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .http()
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Create an order from a cart snapshot.
    ///
    /// Returns the new order id and the opaque payment-processor fields
    /// the redirect form must carry.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token; the cart is
    /// never touched by this call.
    #[instrument(skip(self, token, request), fields(total = %request.total_amount))]
    pub async fn create_order(
        &self,
        token: &str,
        request: &CheckoutRequest,
    ) -> Result<OrderCreated, ApiError> {
        let response = self
            .http()
            .post(self.url("/api/orders"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Fetch an order record by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, `Unauthorized`
    /// without a valid token, or another error if the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn get_order(&self, token: &str, order_id: &OrderId) -> Result<Order, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/api/orders/{order_id}")))
            .bearer_auth(token)
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Ask the backend to email the receipt for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn send_receipt_email(
        &self,
        token: &str,
        order_id: &OrderId,
        email: &Email,
    ) -> Result<(), ApiError> {
        let response = self
            .http()
            .post(self.url(&format!("/api/orders/{order_id}/send-email")))
            .bearer_auth(token)
            .json(&SendEmailRequest {
                email: email.clone(),
            })
            .send()
            .await?;

        Self::read_ack(response).await
    }

    /// Download the PDF receipt for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn fetch_receipt_pdf(
        &self,
        token: &str,
        order_id: &OrderId,
    ) -> Result<Vec<u8>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/api/orders/{order_id}/generate-pdf")))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: "receipt generation failed".to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
