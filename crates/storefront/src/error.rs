//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers should
//! return `Result<T, AppError>`.
//!
//! The propagation policy: every failure is caught at the component
//! boundary and turned into a user-visible response, and none leaves the
//! cart partially mutated - the cart store persists all-or-nothing, and
//! the checkout/resolve services only touch the cart on a confirmed
//! payment.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use arana_core::CartError;

use crate::api::ApiError;
use crate::services::cart::CartStoreError;
use crate::services::checkout::CheckoutError;
use crate::services::orders::ResolveError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Cart store operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartStoreError),

    /// Checkout preparation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order resolution failed.
    #[error("Order resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// No session credential; the user must log in first.
    #[error("Login required")]
    AuthRequired,

    /// Request rejected before any state change (bad quantity, unknown
    /// size, malformed input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A checkout submission is already in flight for this session.
    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    /// Session read/write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be redirected to the login page instead
    /// of answered with a status code.
    const fn wants_login(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired
                | Self::Checkout(CheckoutError::AuthRequired)
                | Self::Resolve(ResolveError::AuthRequired)
                | Self::Api(ApiError::Unauthorized)
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::CheckoutInProgress => StatusCode::CONFLICT,
            Self::Api(err) | Self::Checkout(CheckoutError::Api(err)) => match err {
                ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                // Surface backend rejections of our input as client errors
                ApiError::Api { status, .. } if *status < 500 => StatusCode::BAD_REQUEST,
                ApiError::Http(_) | ApiError::Api { .. } | ApiError::Parse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Checkout(CheckoutError::AuthRequired) | Self::Resolve(ResolveError::AuthRequired) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Checkout(CheckoutError::EmptyCart) => StatusCode::BAD_REQUEST,
            Self::Resolve(ResolveError::Lookup(ApiError::NotFound(_))) => StatusCode::NOT_FOUND,
            Self::Resolve(ResolveError::Lookup(_)) => StatusCode::BAD_GATEWAY,
            Self::Cart(CartStoreError::Cart(_)) | Self::Resolve(ResolveError::Cart(CartStoreError::Cart(_))) => {
                StatusCode::BAD_REQUEST
            }
            Self::Cart(CartStoreError::Persistence(_))
            | Self::Resolve(ResolveError::Cart(CartStoreError::Persistence(_)))
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message. Internal details are never exposed.
    fn message(&self) -> String {
        match self {
            Self::Session(_) | Self::Internal(_) | Self::Cart(CartStoreError::Persistence(_)) => {
                "Internal server error".to_string()
            }
            Self::Api(ApiError::Http(_))
            | Self::Api(ApiError::Parse(_))
            | Self::Checkout(CheckoutError::Api(ApiError::Http(_) | ApiError::Parse(_))) => {
                "The shop service is unreachable. Please try again.".to_string()
            }
            Self::Resolve(ResolveError::Lookup(ApiError::NotFound(_))) => {
                "Order not found".to_string()
            }
            Self::Resolve(ResolveError::Lookup(_)) => {
                "Failed to load order details. Please try again.".to_string()
            }
            Self::Api(ApiError::Api { message, .. })
            | Self::Checkout(CheckoutError::Api(ApiError::Api { message, .. })) => message.clone(),
            Self::Cart(CartStoreError::Cart(err))
            | Self::Resolve(ResolveError::Cart(CartStoreError::Cart(err))) => err.to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether this class of error is reported to Sentry.
    const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Session(_)
                | Self::Api(ApiError::Http(_) | ApiError::Parse(_))
                | Self::Checkout(CheckoutError::Api(ApiError::Http(_) | ApiError::Parse(_)))
                | Self::Resolve(ResolveError::Lookup(ApiError::Http(_) | ApiError::Parse(_)))
                | Self::Cart(CartStoreError::Persistence(_))
        )
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        Self::Cart(CartStoreError::Cart(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // A missing credential is surfaced as a redirect to login, not a
        // silent failure; the cart stays as it was.
        if self.wants_login() {
            return Redirect::to("/auth/login").into_response();
        }

        (self.status(), self.message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
