//! Product queries

use catalog_common::PaginationQuery;

use crate::domain::entities::ProductId;

/// List available products, one page at a time
#[derive(Debug, Clone, Default)]
pub struct ListProductsQuery {
    pub pagination: PaginationQuery,
}

impl ListProductsQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            pagination: PaginationQuery::new(page, limit),
        }
    }
}

/// Fetch one available product
#[derive(Debug, Clone, Copy)]
pub struct GetProductQuery {
    pub id: ProductId,
}
