//! Product lifecycle handler

use std::sync::Arc;

use catalog_common::{Paginated, PaginationDefaults};
use catalog_errors::{AppError, AppResult};
use tracing::{debug, info};

use crate::domain::entities::{Product, ProductId, ProductPatch};
use crate::domain::repositories::ProductRepository;

use super::commands::*;
use super::queries::*;

/// The error every lookup of a missing or retired product reports
pub fn product_not_found(id: ProductId) -> AppError {
    AppError::not_found(format!("Product with id {} not found", id))
}

pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    pagination: PaginationDefaults,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>, pagination: PaginationDefaults) -> Self {
        Self { repo, pagination }
    }

    /// Create a product
    pub async fn create(&self, cmd: CreateProductCommand) -> AppResult<Product> {
        cmd.validate()?;

        let product = self.repo.insert(cmd.into_new_product()).await?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// List available products
    ///
    /// A page past the last one is empty, not an error.
    pub async fn find_all(&self, query: ListProductsQuery) -> AppResult<Paginated<Product>> {
        let pagination = query.pagination.resolve(&self.pagination);

        let total = self.repo.count_available().await?;
        let data = self
            .repo
            .list_available(pagination.offset(), pagination.limit)
            .await?;

        debug!(
            page = pagination.page,
            limit = pagination.limit,
            total,
            returned = data.len(),
            "Products listed"
        );

        Ok(Paginated::new(data, total, &pagination))
    }

    /// Fetch an available product
    pub async fn find_one(&self, query: GetProductQuery) -> AppResult<Product> {
        self.repo
            .find_available(query.id)
            .await?
            .ok_or_else(|| product_not_found(query.id))
    }

    /// Patch an available product
    pub async fn update(&self, cmd: UpdateProductCommand) -> AppResult<Product> {
        cmd.validate()?;

        self.find_one(GetProductQuery { id: cmd.id }).await?;

        let product = self
            .repo
            .update(cmd.id, cmd.patch)
            .await?
            .ok_or_else(|| product_not_found(cmd.id))?;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Soft-delete an available product
    pub async fn remove(&self, cmd: RemoveProductCommand) -> AppResult<Product> {
        self.find_one(GetProductQuery { id: cmd.id }).await?;

        let product = self
            .repo
            .update(cmd.id, ProductPatch::retire())
            .await?
            .ok_or_else(|| product_not_found(cmd.id))?;

        info!(product_id = %product.id, "Product removed");
        Ok(product)
    }
}
