//! Checkout route handlers.
//!
//! `submit` runs phase 1 (order creation) and then renders phase 2: an
//! auto-submitting form that POSTs the server-issued fields to the
//! payment processor. Submitting that form is a terminal, full-page
//! navigation - nothing here runs afterwards, so the cart is only cleared
//! on the return leg (`/orders/{id}`), never optimistically.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::checkout::{
    CheckoutCoordinator, RedirectDescriptor, begin_submission, end_submission,
};
use crate::state::AppState;

use super::cart::store;

/// Payment redirect page template: an auto-submitting form carrying the
/// opaque processor fields.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/redirect.html")]
pub struct CheckoutRedirectTemplate {
    pub order_id: String,
    pub action_url: String,
    pub fields: Vec<(String, String)>,
}

impl From<RedirectDescriptor> for CheckoutRedirectTemplate {
    fn from(descriptor: RedirectDescriptor) -> Self {
        Self {
            order_id: descriptor.order_id.to_string(),
            action_url: descriptor.action_url,
            fields: descriptor.fields.into_iter().collect(),
        }
    }
}

/// Cancelled-payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/cancelled.html")]
pub struct CheckoutCancelledTemplate;

/// Submit the cart as an order and hand off to the payment processor.
///
/// Guarded against duplicate submission: a second POST while the
/// order-creation call is in flight for this session is rejected with
/// 409 and creates no order.
#[instrument(skip(state, session, user))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CheckoutRedirectTemplate> {
    let cart = store(session.clone()).get().await;
    let credential = user.as_ref().map(|u| u.token.as_str());

    if !begin_submission(&session).await? {
        return Err(AppError::CheckoutInProgress);
    }

    let coordinator = CheckoutCoordinator::new(state.api(), &state.config().payment);
    let prepared = coordinator.prepare(credential, &cart).await;

    // Release the marker on both paths; on success the browser is about
    // to leave this page context for the processor.
    if let Err(e) = end_submission(&session).await {
        warn!("Failed to release checkout marker: {e}");
    }

    Ok(CheckoutRedirectTemplate::from(prepared?))
}

/// Processor return leg for an abandoned payment. The order stays
/// `Pending` on the server and the cart is left intact for retry.
#[instrument]
pub async fn cancelled() -> CheckoutCancelledTemplate {
    CheckoutCancelledTemplate
}
