//! Message payloads
//!
//! Unknown fields are rejected; constraint checks live on the commands.

use catalog_errors::{AppError, AppResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::{
    CreateProductCommand, GetProductQuery, ListProductsQuery, RemoveProductCommand,
    UpdateProductCommand,
};
use crate::domain::entities::{ProductId, ProductPatch};

/// Deserialize a payload, reporting shape errors as validation failures
pub fn parse<T: DeserializeOwned>(data: Value) -> AppResult<T> {
    serde_json::from_value(data).map_err(|e| AppError::validation(e.to_string()))
}

fn product_id(id: i64) -> AppResult<ProductId> {
    if id <= 0 {
        return Err(AppError::validation("id must be a positive integer"));
    }
    Ok(ProductId(id))
}

fn positive(value: Option<i64>, field: &str) -> AppResult<Option<i64>> {
    match value {
        Some(v) if v <= 0 => Err(AppError::validation(format!(
            "{} must be a positive integer",
            field
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProductDto {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub available: Option<bool>,
}

impl CreateProductDto {
    pub fn into_command(self) -> CreateProductCommand {
        CreateProductCommand {
            name: self.name,
            price: self.price,
            available: self.available,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationDto {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PaginationDto {
    /// `null` or a missing payload means "first page, default size"
    pub fn from_data(data: Value) -> AppResult<Self> {
        if data.is_null() {
            return Ok(Self::default());
        }
        parse(data)
    }

    pub fn into_query(self) -> AppResult<ListProductsQuery> {
        Ok(ListProductsQuery::new(
            positive(self.page, "page")?,
            positive(self.limit, "limit")?,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdDto {
    pub id: i64,
}

/// Either a bare id or `{ "id": n }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IdPayload {
    Bare(i64),
    Object(IdDto),
}

impl IdPayload {
    pub fn id(&self) -> AppResult<ProductId> {
        match self {
            Self::Bare(id) => product_id(*id),
            Self::Object(dto) => product_id(dto.id),
        }
    }

    pub fn into_get_query(self) -> AppResult<GetProductQuery> {
        Ok(GetProductQuery { id: self.id()? })
    }

    pub fn into_remove_command(self) -> AppResult<RemoveProductCommand> {
        Ok(RemoveProductCommand { id: self.id()? })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductDto {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl UpdateProductDto {
    /// The `id` selects the target and is never part of the patch
    pub fn into_command(self) -> AppResult<UpdateProductCommand> {
        Ok(UpdateProductCommand {
            id: product_id(self.id)?,
            patch: ProductPatch {
                name: self.name,
                price: self.price,
                available: self.available,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_rejects_unknown_fields() {
        let err = parse::<CreateProductDto>(json!({ "name": "Pen", "price": 1.0, "color": "red" }))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_create_requires_name_and_price() {
        assert!(parse::<CreateProductDto>(json!({ "price": 1.0 })).is_err());
        assert!(parse::<CreateProductDto>(json!({ "name": "Pen" })).is_err());
    }

    #[test]
    fn test_pagination_accepts_null_and_empty() {
        let dto = PaginationDto::from_data(Value::Null).unwrap();
        assert!(dto.page.is_none() && dto.limit.is_none());

        let dto = PaginationDto::from_data(json!({})).unwrap();
        assert!(dto.page.is_none() && dto.limit.is_none());
    }

    #[test]
    fn test_pagination_rejects_non_positive() {
        let dto = PaginationDto::from_data(json!({ "page": 0 })).unwrap();
        let err = dto.into_query().unwrap_err();
        assert_eq!(err.message(), "page must be a positive integer");
    }

    #[test]
    fn test_id_payload_shapes() {
        let bare: IdPayload = parse(json!(5)).unwrap();
        assert_eq!(bare.id().unwrap(), ProductId(5));

        let object: IdPayload = parse(json!({ "id": 6 })).unwrap();
        assert_eq!(object.id().unwrap(), ProductId(6));

        assert!(parse::<IdPayload>(json!({ "id": 6, "extra": true })).is_err());
        assert!(parse::<IdPayload>(json!("six")).is_err());

        let zero: IdPayload = parse(json!(0)).unwrap();
        assert_eq!(zero.id().unwrap_err().status_code(), 400);
    }

    #[test]
    fn test_update_strips_id_from_patch() {
        let dto: UpdateProductDto = parse(json!({ "id": 3, "price": 9.5 })).unwrap();
        let cmd = dto.into_command().unwrap();
        assert_eq!(cmd.id, ProductId(3));
        assert_eq!(cmd.patch.price, Some(9.5));
        assert!(cmd.patch.name.is_none());
        assert!(cmd.patch.available.is_none());
    }
}
