use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::{Order, OrderStatus};
use crate::error::AppError;
use crate::ports::{OrderRepository, ProductCatalog, StatusSummary};

const RECENT_ORDERS: i64 = 5;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_products: i64,
    /// Sum of paid, shipped and delivered orders.
    pub total_revenue: i64,
    pub pending_orders: i64,
    pub by_status: Vec<StatusSummary>,
    pub recent_orders: Vec<Order>,
}

#[derive(Clone)]
pub struct Dashboard {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
}

impl Dashboard {
    pub fn new(orders: Arc<dyn OrderRepository>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { orders, catalog }
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let mut by_status = self.orders.status_summary().await?;
        by_status.sort_by_key(|s| OrderStatus::ALL.iter().position(|status| *status == s.status));

        let total_orders = by_status.iter().map(|s| s.count).sum();
        let total_revenue = by_status
            .iter()
            .filter(|s| s.status.is_revenue())
            .fold(0i64, |acc, s| acc.saturating_add(s.total_amount));
        let pending_orders = by_status
            .iter()
            .find(|s| s.status == OrderStatus::Pending)
            .map_or(0, |s| s.count);

        Ok(DashboardStats {
            total_orders,
            total_products: self.catalog.count().await?,
            total_revenue,
            pending_orders,
            by_status,
            recent_orders: self.orders.list(None, RECENT_ORDERS, 0).await?,
        })
    }
}
