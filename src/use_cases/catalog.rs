//! Product listing and admin product creation.

use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Product;
use crate::error::AppError;
use crate::ports::ProductCatalog;
use crate::validation::{
    sanitize_string, validate_max_len, validate_positive_amount, validate_required, NAME_MAX_LEN,
};

pub const DEFAULT_PRODUCT_PAGE: i64 = 50;
pub const MAX_PRODUCT_PAGE: i64 = 200;
const DESCRIPTION_MAX_LEN: usize = 5000;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProduct {
    fn into_product(self) -> Result<Product, AppError> {
        let name = sanitize_string(&self.name);
        validate_required("name", &name)?;
        validate_max_len("name", &name, NAME_MAX_LEN)?;
        validate_positive_amount("price", self.price)?;
        let category = sanitize_string(&self.category);
        validate_required("category", &category)?;
        let description = self.description.unwrap_or_default().trim().to_string();
        validate_max_len("description", &description, DESCRIPTION_MAX_LEN)?;
        let image = self
            .image
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());

        Ok(Product::new(name, self.price, image, category, description))
    }
}

#[derive(Clone)]
pub struct Catalog {
    products: Arc<dyn ProductCatalog>,
}

impl Catalog {
    pub fn new(products: Arc<dyn ProductCatalog>) -> Self {
        Self { products }
    }

    pub async fn list(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Product>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PRODUCT_PAGE).clamp(1, MAX_PRODUCT_PAGE);
        let offset = offset.unwrap_or(0).max(0);
        Ok(self.products.list(limit, offset).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, AppError> {
        Ok(self.products.get(id).await?)
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, AppError> {
        let product = input.into_product()?;
        let product = self.products.insert(&product).await?;
        tracing::info!(product_id = %product.id, price = product.price, "Product created");
        Ok(product)
    }
}
