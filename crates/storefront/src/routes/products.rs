//! Product route handlers.
//!
//! The product page is where stock bounds are enforced: the quantity
//! selector is capped at the chosen size's stock, and `/cart/add`
//! re-checks the same bound server-side before touching the ledger.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use arana_core::{Price, ProductId};

use crate::api::types::Product;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub from_price: String,
    pub image: Option<String>,
    pub sizes: Vec<SizeView>,
}

/// Size variant display data for templates.
#[derive(Clone)]
pub struct SizeView {
    pub size: String,
    pub price: String,
    pub stock: u32,
    pub available: bool,
}

/// Format a price for display.
pub(crate) fn format_price(price: Price) -> String {
    price.to_string()
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let from_price = product
            .sizes
            .iter()
            .map(|s| s.price)
            .min()
            .map_or_else(|| format_price(Price::ZERO), format_price);

        Self {
            id: product.product_id.to_string(),
            name: product.product_name.clone(),
            description: product.description.clone(),
            from_price,
            image: product.primary_image().map(String::from),
            sizes: product
                .sizes
                .iter()
                .map(|s| SizeView {
                    size: s.size.clone(),
                    // Raw amount; the template renders it through the
                    // `lkr` filter.
                    price: s.price.amount().to_string(),
                    stock: s.stock,
                    available: s.stock > 0,
                })
                .collect(),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
}

/// Display product listing page.
pub async fn index(State(state): State<AppState>) -> Result<ProductsIndexTemplate> {
    let products = state.api().list_products().await?;

    Ok(ProductsIndexTemplate {
        products: products.iter().map(ProductView::from).collect(),
    })
}

/// Display product detail page.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let product = state.api().get_product(&ProductId::new(id)).await?;

    Ok(ProductShowTemplate {
        product: ProductView::from(&product),
    })
}
