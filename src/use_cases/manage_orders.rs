//! Order reads and guarded status changes for customers and admins.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Order, OrderStatus, PaymentDetails, TransitionActor};
use crate::error::AppError;
use crate::ports::OrderRepository;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
}

impl OrderManager {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn get(&self, id: Uuid) -> Result<Order, AppError> {
        Ok(self.orders.get_by_id(id).await?)
    }

    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Order>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        Ok(self.orders.list(status, limit, offset).await?)
    }

    pub async fn cancel_by_customer(&self, id: Uuid) -> Result<Order, AppError> {
        self.transition(id, OrderStatus::Cancelled, TransitionActor::Customer)
            .await
    }

    pub async fn admin_transition(&self, id: Uuid, next: OrderStatus) -> Result<Order, AppError> {
        self.transition(id, next, TransitionActor::Admin).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.orders.delete(id).await? {
            return Err(AppError::NotFound(format!("order {}", id)));
        }
        tracing::warn!(order_id = %id, "Order deleted");
        Ok(())
    }

    async fn transition(
        &self,
        id: Uuid,
        next: OrderStatus,
        actor: TransitionActor,
    ) -> Result<Order, AppError> {
        let order = self.orders.get_by_id(id).await?;
        order.check_transition(next, actor)?;

        // Manual settlement (e.g. a bank transfer seen on the statement) stamps paid_at.
        let details = if next == OrderStatus::Paid {
            let mut details = order
                .payment_details
                .clone()
                .unwrap_or_else(|| PaymentDetails::new(order.payment_method, order.total_amount));
            details.paid_at.get_or_insert_with(Utc::now);
            Some(details)
        } else {
            None
        };

        let updated = self
            .orders
            .update_status(order.id, order.status, next, details.as_ref())
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "order {} is no longer {}; reload and retry",
                    order.id, order.status
                ))
            })?;

        tracing::info!(
            order_id = %updated.id,
            from = %order.status,
            to = %updated.status,
            actor = %actor,
            "Order status changed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryOrderRepository;
    use crate::domain::{CustomerInfo, OrderLine, PaymentMethod};
    use crate::use_cases::testing::RacingOrderRepository;

    fn order(method: PaymentMethod) -> Order {
        Order::new(
            None,
            vec![OrderLine {
                product_id: Uuid::new_v4(),
                name: "Den ban".to_string(),
                unit_price: 90_000,
                quantity: 1,
            }],
            CustomerInfo {
                name: "Pham D".to_string(),
                email: "d@example.vn".to_string(),
                phone: "0933333333".to_string(),
                address: "4 Tran Phu".to_string(),
                city: None,
                note: None,
            },
            method,
        )
    }

    async fn manager_with(order: &Order) -> OrderManager {
        let orders = Arc::new(InMemoryOrderRepository::new());
        orders.insert(order).await.unwrap();
        OrderManager::new(orders)
    }

    #[tokio::test]
    async fn customer_cancels_pending_only() {
        let order = order(PaymentMethod::Cod);
        let manager = manager_with(&order).await;

        let cancelled = manager.cancel_by_customer(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let again = manager.cancel_by_customer(order.id).await;
        assert!(matches!(again, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn customer_cannot_cancel_after_payment() {
        let order = order(PaymentMethod::Banking);
        let manager = manager_with(&order).await;

        for next in [OrderStatus::Paid, OrderStatus::Shipped, OrderStatus::Delivered] {
            manager.admin_transition(order.id, next).await.unwrap();
            let result = manager.cancel_by_customer(order.id).await;
            assert!(matches!(result, Err(AppError::InvalidTransition(_))));
        }
    }

    #[tokio::test]
    async fn admin_paid_stamps_paid_at() {
        let order = order(PaymentMethod::Banking);
        let manager = manager_with(&order).await;

        let paid = manager
            .admin_transition(order.id, OrderStatus::Paid)
            .await
            .unwrap();
        let details = paid.payment_details.unwrap();
        assert_eq!(details.method, PaymentMethod::Banking);
        assert_eq!(details.amount, 90_000);
        assert!(details.paid_at.is_some());
    }

    #[tokio::test]
    async fn admin_cannot_skip_states() {
        let order = order(PaymentMethod::Momo);
        let manager = manager_with(&order).await;

        let result = manager
            .admin_transition(order.id, OrderStatus::Delivered)
            .await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn cod_ships_from_processing() {
        let order = order(PaymentMethod::Cod);
        let manager = manager_with(&order).await;

        manager
            .admin_transition(order.id, OrderStatus::Processing)
            .await
            .unwrap();
        let shipped = manager
            .admin_transition(order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn concurrent_change_is_conflict() {
        let order = order(PaymentMethod::Banking);
        let orders =
            Arc::new(RacingOrderRepository::with_order(&order, OrderStatus::Cancelled).await);
        let manager = OrderManager::new(orders.clone());

        let result = manager.admin_transition(order.id, OrderStatus::Paid).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(
            orders.get_by_id(order.id).await.unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let order = order(PaymentMethod::Cod);
        let manager = manager_with(&order).await;

        manager.delete(order.id).await.unwrap();
        assert!(matches!(
            manager.delete(order.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_clamps_page_size() {
        let order = order(PaymentMethod::Cod);
        let manager = manager_with(&order).await;

        let all = manager.list(None, Some(10_000), Some(-3)).await.unwrap();
        assert_eq!(all.len(), 1);
        let none = manager
            .list(Some(OrderStatus::Paid), None, None)
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
