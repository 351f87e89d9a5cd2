//! Storage ports. Use cases depend on these traits; adapters implement them.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Cart, Order, OrderStatus, PaymentDetails, Product};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<redis::RedisError> for RepositoryError {
    fn from(err: redis::RedisError) -> Self {
        RepositoryError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Corrupt(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Order count and summed totals for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusSummary {
    pub status: OrderStatus,
    pub count: i64,
    pub total_amount: i64,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> RepositoryResult<Order>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Order>;

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Order>>;

    /// Compare-and-set on the status column. Returns `None` when the order is
    /// missing or no longer in `expected`.
    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        payment_details: Option<&PaymentDetails>,
    ) -> RepositoryResult<Option<Order>>;

    /// Replaces payment details only while the order is still in `expected`.
    async fn set_payment_details(
        &self,
        id: Uuid,
        expected: OrderStatus,
        payment_details: &PaymentDetails,
    ) -> RepositoryResult<Option<Order>>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    async fn status_summary(&self) -> RepositoryResult<Vec<StatusSummary>>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get(&self, id: Uuid) -> RepositoryResult<Product>;

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Product>>;

    async fn insert(&self, product: &Product) -> RepositoryResult<Product>;

    async fn count(&self) -> RepositoryResult<i64>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Missing or expired carts load as empty.
    async fn load(&self, key: &str) -> RepositoryResult<Cart>;

    /// Writes the whole cart and refreshes its TTL.
    async fn save(&self, cart: &Cart) -> RepositoryResult<()>;

    async fn clear(&self, key: &str) -> RepositoryResult<()>;
}
