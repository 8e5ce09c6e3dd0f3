//! Order route handlers: the post-payment return leg.
//!
//! The confirmation page fetches the authoritative order record and
//! reconciles the local cart (cleared once the order reports paid).
//! Receipt delivery (email, PDF) is proxied to the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arana_core::{Email, Order, OrderId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::orders::OrderStatusResolver;
use crate::state::AppState;

use super::cart::store;
use super::products::format_price;

/// Order item display data for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub line_price: String,
    pub image: String,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub order_id: String,
    pub status: String,
    pub paid: bool,
    pub retryable: bool,
    pub placed_on: String,
    pub items: Vec<OrderItemView>,
    pub total: String,
    pub payment_id: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            status: order.status.to_string(),
            paid: order.status.is_paid(),
            retryable: order.status.is_retryable(),
            placed_on: order.created_at.format("%B %-d, %Y %H:%M").to_string(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.product_name.clone(),
                    size: item.size.clone(),
                    quantity: item.quantity,
                    line_price: format_price(item.line_total()),
                    image: item.image.clone(),
                })
                .collect(),
            total: format_price(order.total_amount),
            payment_id: order.payment_id.as_ref().map(ToString::to_string),
        }
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub order: OrderView,
}

/// Email receipt form data.
#[derive(Debug, Deserialize)]
pub struct EmailReceiptForm {
    pub email: String,
}

/// Display the order confirmation page, reconciling the local cart
/// against the server's order status.
#[instrument(skip(state, session, user), fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<OrderShowTemplate> {
    let cart_store = store(session);
    let resolver = OrderStatusResolver::new(state.api(), &cart_store);

    let reconciliation = resolver
        .resolve(Some(&user.token), &OrderId::new(id))
        .await?;

    Ok(OrderShowTemplate {
        order: OrderView::from(&reconciliation.order),
    })
}

/// Email the receipt for an order (HTMX fragment response).
#[instrument(skip(state, user, form), fields(order_id = %id))]
pub async fn email_receipt(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<EmailReceiptForm>,
) -> Result<Html<String>> {
    let email = Email::parse(&form.email).map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .api()
        .send_receipt_email(&user.token, &OrderId::new(id), &email)
        .await?;

    Ok(Html(format!(
        "<span class=\"text-green-600\">Receipt sent to {email}</span>"
    )))
}

/// Download the PDF receipt for an order.
#[instrument(skip(state, user), fields(order_id = %id))]
pub async fn receipt(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let order_id = OrderId::new(id);
    let pdf = state.api().fetch_receipt_pdf(&user.token, &order_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"receipt-{order_id}.pdf\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
