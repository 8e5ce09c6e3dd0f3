//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page
//! reloads. The cart itself lives in a single session slot managed by
//! [`CartStore`]; every handler builds a store over the request's
//! session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arana_core::{Cart, LineItem, LineItemKey, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::services::cart::{CartStore, SessionCart};
use crate::state::AppState;

use super::products::format_price;

/// Build the session-backed cart store for this request.
pub(crate) fn store(session: Session) -> CartStore<SessionCart> {
    CartStore::new(SessionCart::new(session))
}

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub size: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub unit_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: format_price(arana_core::Price::ZERO),
            unit_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id.to_string(),
                    size: item.size.clone(),
                    name: item.product_name.clone(),
                    quantity: item.quantity,
                    price: format_price(item.price),
                    line_price: format_price(item.line_total()),
                    image: item.image.clone(),
                })
                .collect(),
            subtotal: format_price(cart.total()),
            unit_count: cart.unit_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub size: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub size: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
    pub size: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> CartShowTemplate {
    let cart = store(session).get().await;

    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Add item to cart (HTMX).
///
/// The selection is validated against the authoritative product record:
/// an unknown size, or a quantity outside `[1, stock]`, is rejected
/// before the ledger is touched. The stored price, name, and image come
/// from the product record, never from the form.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id, size = %form.size))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    let product_id = ProductId::new(form.product_id);

    let product = state.api().get_product(&product_id).await?;
    let size = product.size(&form.size).ok_or_else(|| {
        AppError::Validation(format!(
            "{} is not available in size {}",
            product.product_name, form.size
        ))
    })?;

    if quantity < 1 || quantity > size.stock {
        return Err(AppError::Validation(format!(
            "quantity must be between 1 and {} for size {}",
            size.stock, size.size
        )));
    }

    let cart = store(session)
        .add(LineItem {
            product_id,
            size: size.size.clone(),
            quantity,
            price: size.price,
            product_name: product.product_name.clone(),
            image: product.primary_image().unwrap_or_default().to_owned(),
        })
        .await?;

    // Return cart count with HTMX trigger to update other elements
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.unit_count(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
///
/// Quantities below one are rejected, not clamped; the entry and the
/// persisted slot stay unchanged.
#[instrument(skip(session, form), fields(product_id = %form.product_id, size = %form.size))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let key = LineItemKey::new(ProductId::new(form.product_id), form.size);
    let cart = store(session).set_quantity(&key, form.quantity).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Remove item from cart (HTMX). Removing an absent item is a no-op.
#[instrument(skip(session, form), fields(product_id = %form.product_id, size = %form.size))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let key = LineItemKey::new(ProductId::new(form.product_id), form.size);
    let cart = store(session).remove(&key).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> CartCountTemplate {
    let cart = store(session).get().await;

    CartCountTemplate {
        count: cart.unit_count(),
    }
}
