//! Repository doubles shared by the use case tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::adapters::InMemoryOrderRepository;
use crate::domain::{Order, OrderStatus, PaymentDetails};
use crate::ports::{OrderRepository, RepositoryResult, StatusSummary};

/// Simulates a concurrent writer: the first `update_status` moves the order to
/// `racer` behind the caller's back and reports a compare-and-set miss.
pub(crate) struct RacingOrderRepository {
    inner: InMemoryOrderRepository,
    racer: OrderStatus,
    raced: tokio::sync::Mutex<bool>,
}

impl RacingOrderRepository {
    pub(crate) async fn with_order(order: &Order, racer: OrderStatus) -> Self {
        let inner = InMemoryOrderRepository::new();
        inner.insert(order).await.expect("seed order");
        Self {
            inner,
            racer,
            raced: tokio::sync::Mutex::new(false),
        }
    }
}

#[async_trait]
impl OrderRepository for RacingOrderRepository {
    async fn insert(&self, order: &Order) -> RepositoryResult<Order> {
        self.inner.insert(order).await
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Order> {
        self.inner.get_by_id(id).await
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Order>> {
        self.inner.list(status, limit, offset).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        payment_details: Option<&PaymentDetails>,
    ) -> RepositoryResult<Option<Order>> {
        let mut raced = self.raced.lock().await;
        if !*raced {
            *raced = true;
            self.inner
                .update_status(id, expected, self.racer, None)
                .await?;
            return Ok(None);
        }
        self.inner
            .update_status(id, expected, next, payment_details)
            .await
    }

    async fn set_payment_details(
        &self,
        id: Uuid,
        expected: OrderStatus,
        payment_details: &PaymentDetails,
    ) -> RepositoryResult<Option<Order>> {
        self.inner
            .set_payment_details(id, expected, payment_details)
            .await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        self.inner.delete(id).await
    }

    async fn status_summary(&self) -> RepositoryResult<Vec<StatusSummary>> {
        self.inner.status_summary().await
    }
}
