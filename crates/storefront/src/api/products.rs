//! Product read endpoints.
//!
//! Products are public (no bearer token) and cached for five minutes;
//! stock figures can therefore lag slightly, which is acceptable because
//! the backend re-validates stock at order creation.

use tracing::{debug, instrument};

use arana_core::ProductId;

use super::{ApiClient, ApiError, types::Product};

impl ApiClient {
    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(product) = self.product_cache().get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let response = self
            .http()
            .get(self.url(&format!("/api/products/{product_id}")))
            .send()
            .await?;

        let product: Product = Self::read_json(response).await?;

        self.product_cache()
            .insert(cache_key, product.clone())
            .await;

        Ok(product)
    }

    /// Fetch the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self.http().get(self.url("/api/products")).send().await?;
        Self::read_json(response).await
    }

    /// Invalidate a cached product (after stock-sensitive operations).
    pub async fn invalidate_product(&self, product_id: &ProductId) {
        self.product_cache()
            .invalidate(&format!("product:{product_id}"))
            .await;
    }
}
