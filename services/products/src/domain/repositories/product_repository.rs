//! Product store port

use async_trait::async_trait;
use catalog_errors::AppResult;

use crate::domain::entities::{NewProduct, Product, ProductId, ProductPatch};

/// Product store
///
/// Reads only ever see available products. Writes are keyed by id alone.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Number of available products
    async fn count_available(&self) -> AppResult<u64>;

    /// One page of available products in a stable order
    async fn list_available(&self, offset: u64, limit: u64) -> AppResult<Vec<Product>>;

    /// Look up an available product
    async fn find_available(&self, id: ProductId) -> AppResult<Option<Product>>;

    /// Insert a product; the store assigns id and timestamps
    async fn insert(&self, product: NewProduct) -> AppResult<Product>;

    /// Apply `patch` and refresh `updated_at`
    ///
    /// Returns `None` if no row has that id.
    async fn update(&self, id: ProductId, patch: ProductPatch) -> AppResult<Option<Product>>;
}
