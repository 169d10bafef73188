//! PostgreSQL repository implementation

use async_trait::async_trait;
use catalog_bootstrap::DbQueryTimer;
use catalog_errors::{AppError, AppResult};
use sqlx::PgPool;

use crate::domain::entities::{NewProduct, Product, ProductId, ProductPatch};
use crate::domain::repositories::ProductRepository;

use super::rows::ProductRow;

const TABLE: &str = "products";

/// Page bounds past `BIGINT` still select nothing, so they saturate
fn to_bind(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn count_available(&self) -> AppResult<u64> {
        let timer = DbQueryTimer::new("count", TABLE);
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE available = TRUE",
        )
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let count =
            result.map_err(|e| AppError::database(format!("Failed to count products: {}", e)))?;
        Ok(count.max(0) as u64)
    }

    async fn list_available(&self, offset: u64, limit: u64) -> AppResult<Vec<Product>> {
        let offset = to_bind(offset);
        let limit = to_bind(limit);

        let timer = DbQueryTimer::new("select", TABLE);
        let result = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE available = TRUE
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let rows =
            result.map_err(|e| AppError::database(format!("Failed to list products: {}", e)))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_available(&self, id: ProductId) -> AppResult<Option<Product>> {
        let timer = DbQueryTimer::new("select", TABLE);
        let result = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE id = $1 AND available = TRUE
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let row =
            result.map_err(|e| AppError::database(format!("Failed to find product: {}", e)))?;
        Ok(row.map(Product::from))
    }

    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let timer = DbQueryTimer::new("insert", TABLE);
        let result = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, price, available)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, available, created_at, updated_at
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.available)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let row =
            result.map_err(|e| AppError::database(format!("Failed to insert product: {}", e)))?;
        Ok(row.into())
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> AppResult<Option<Product>> {
        let timer = DbQueryTimer::new("update", TABLE);
        let result = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                available = COALESCE($4, available),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, price, available, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(patch.name)
        .bind(patch.price)
        .bind(patch.available)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let row =
            result.map_err(|e| AppError::database(format!("Failed to update product: {}", e)))?;
        Ok(row.map(Product::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds_saturate_at_bigint() {
        assert_eq!(to_bind(40), 40);
        assert_eq!(to_bind(i64::MAX as u64), i64::MAX);
        assert_eq!(to_bind(9_999_999_999_999_999_990), i64::MAX);
        assert_eq!(to_bind(u64::MAX), i64::MAX);
    }
}
