//! Product API

use crate::{ApiClient, ApiResult};
use shared::models::{Product, ProductRequest, StockUpdate};

impl ApiClient {
    /// List all products
    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.get("api/products").await
    }

    /// Fetch a single product
    pub async fn get_product(&self, product_id: u64) -> ApiResult<Product> {
        self.get(&format!("api/products/{product_id}")).await
    }

    /// Create a product (admin)
    pub async fn create_product(&self, product: &ProductRequest) -> ApiResult<Product> {
        self.post("api/products", product).await
    }

    /// Update a product (admin)
    pub async fn update_product(
        &self,
        product_id: u64,
        product: &ProductRequest,
    ) -> ApiResult<Product> {
        self.put(&format!("api/products/{product_id}"), product).await
    }

    /// Delete a product (admin)
    pub async fn delete_product(&self, product_id: u64) -> ApiResult<()> {
        self.delete(&format!("api/products/{product_id}")).await
    }

    /// Check whether `quantity` units are in stock
    pub async fn check_stock(&self, product_id: u64, quantity: u32) -> ApiResult<bool> {
        self.get(&format!(
            "api/products/{product_id}/check-stock?quantity={quantity}"
        ))
        .await
    }

    /// Reduce stock for a batch of products
    pub async fn reduce_stock(&self, items: &[StockUpdate]) -> ApiResult<()> {
        self.post_unit("api/products/reduce-stock", &items).await
    }

    /// Restore stock for a batch of products
    pub async fn restore_stock(&self, items: &[StockUpdate]) -> ApiResult<()> {
        self.post_unit("api/products/restore-stock", &items).await
    }
}
