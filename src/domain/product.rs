use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog product. Prices are whole VND amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub image: Option<String>,
    pub category: String,
    pub rating: f32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: String,
        price: i64,
        image: Option<String>,
        category: String,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            price,
            image,
            category,
            rating: 0.0,
            description,
            created_at: Utc::now(),
        }
    }
}
