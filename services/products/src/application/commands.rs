//! Product commands

use catalog_errors::{AppError, AppResult};

use crate::domain::entities::{NewProduct, ProductId, ProductPatch};

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("price must be a non-negative number"));
    }
    Ok(())
}

/// Create a product
#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub name: String,
    pub price: f64,
    /// Defaults to `true`
    pub available: Option<bool>,
}

impl CreateProductCommand {
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }

    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            price: self.price,
            available: self.available.unwrap_or(true),
        }
    }
}

/// Patch an available product
#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub id: ProductId,
    pub patch: ProductPatch,
}

impl UpdateProductCommand {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.patch.name {
            validate_name(name)?;
        }
        if let Some(price) = self.patch.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

/// Soft-delete a product
#[derive(Debug, Clone, Copy)]
pub struct RemoveProductCommand {
    pub id: ProductId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, price: f64) -> CreateProductCommand {
        CreateProductCommand {
            name: name.to_string(),
            price,
            available: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(create("Lamp", 12.0).validate().is_ok());
        assert!(create("Free sample", 0.0).validate().is_ok());
        assert!(create("  ", 12.0).validate().is_err());
        assert!(create("Lamp", -1.0).validate().is_err());
        assert!(create("Lamp", f64::NAN).validate().is_err());
        assert!(create("Lamp", f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_create_defaults_available() {
        assert!(create("Lamp", 12.0).into_new_product().available);

        let hidden = CreateProductCommand {
            available: Some(false),
            ..create("Lamp", 12.0)
        };
        assert!(!hidden.into_new_product().available);
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let empty = UpdateProductCommand {
            id: ProductId(1),
            patch: ProductPatch::default(),
        };
        assert!(empty.validate().is_ok());

        let bad_price = UpdateProductCommand {
            id: ProductId(1),
            patch: ProductPatch {
                price: Some(-3.0),
                ..Default::default()
            },
        };
        let err = bad_price.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
