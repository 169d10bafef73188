//! Shared test fixtures

use std::sync::Mutex;

use async_trait::async_trait;
use catalog_errors::AppResult;
use chrono::Utc;
use products::domain::{NewProduct, Product, ProductId, ProductPatch, ProductRepository};

/// Store fake: rows are kept in id order, ids are assigned sequentially
#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    /// Stored row regardless of availability
    #[allow(dead_code)]
    pub fn raw(&self, id: ProductId) -> Option<Product> {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn count_available(&self) -> AppResult<u64> {
        Ok(self.rows.lock().unwrap().iter().filter(|p| p.available).count() as u64)
    }

    async fn list_available(&self, offset: u64, limit: u64) -> AppResult<Vec<Product>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.available)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_available(&self, id: ProductId) -> AppResult<Option<Product>> {
        Ok(self.raw(id).filter(|p| p.available))
    }

    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let product = Product {
            id: ProductId(rows.len() as i64 + 1),
            name: product.name,
            price: product.price,
            available: product.available,
            created_at: now,
            updated_at: now,
        };
        rows.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> AppResult<Option<Product>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|p| p.id == id).map(|p| {
            patch.apply_to(p);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }
}
