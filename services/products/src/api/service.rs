//! Message handler for the product patterns

use std::sync::Arc;

use async_trait::async_trait;
use catalog_errors::{AppError, AppResult, RpcError};
use catalog_transport::{MessageHandler, no_message_handler};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::application::ProductService;

use super::dto::{CreateProductDto, IdPayload, PaginationDto, UpdateProductDto, parse};

pub const CREATE_PRODUCT: &str = "create_product";
pub const FIND_ALL_PRODUCTS: &str = "find_all_products";
pub const FIND_ONE_PRODUCT: &str = "find_one_product";
pub const UPDATE_PRODUCT: &str = "update_product";
pub const REMOVE_PRODUCT: &str = "remove_product";

fn to_value<T: Serialize>(value: T) -> AppResult<Value> {
    Ok(serde_json::to_value(value)?)
}

pub struct ProductRpcService {
    service: Arc<ProductService>,
}

impl ProductRpcService {
    pub fn new(service: Arc<ProductService>) -> Self {
        Self { service }
    }

    async fn create(&self, data: Value) -> AppResult<Value> {
        let dto: CreateProductDto = parse(data)?;
        to_value(self.service.create(dto.into_command()).await?)
    }

    async fn find_all(&self, data: Value) -> AppResult<Value> {
        let query = PaginationDto::from_data(data)?.into_query()?;
        to_value(self.service.find_all(query).await?)
    }

    async fn find_one(&self, data: Value) -> AppResult<Value> {
        let query = parse::<IdPayload>(data)?.into_get_query()?;
        to_value(self.service.find_one(query).await?)
    }

    async fn update(&self, data: Value) -> AppResult<Value> {
        let cmd = parse::<UpdateProductDto>(data)?.into_command()?;
        to_value(self.service.update(cmd).await?)
    }

    async fn remove(&self, data: Value) -> AppResult<Value> {
        let cmd = parse::<IdPayload>(data)?.into_remove_command()?;
        to_value(self.service.remove(cmd).await?)
    }
}

/// Log and convert; server-side failures are masked for the caller
fn into_rpc_error(pattern: &str, err: AppError) -> RpcError {
    if err.is_client_error() {
        debug!(pattern, status = err.status_code(), error = %err, "Request rejected");
    } else {
        error!(pattern, error = %err, "Request failed");
    }
    err.to_rpc_error()
}

#[async_trait]
impl MessageHandler for ProductRpcService {
    async fn handle(&self, pattern: &str, data: Value) -> Result<Value, RpcError> {
        let result = match pattern {
            CREATE_PRODUCT => self.create(data).await,
            FIND_ALL_PRODUCTS => self.find_all(data).await,
            FIND_ONE_PRODUCT => self.find_one(data).await,
            UPDATE_PRODUCT => self.update(data).await,
            REMOVE_PRODUCT => self.remove(data).await,
            _ => return Err(no_message_handler()),
        };

        result.map_err(|e| into_rpc_error(pattern, e))
    }
}
