//! In-memory adapters for tests and `serve --in-memory` local runs.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Cart, Order, OrderStatus, PaymentDetails, Product};
use crate::ports::{
    CartStore, OrderRepository, ProductCatalog, RepositoryError, RepositoryResult, StatusSummary,
};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> RepositoryResult<Order> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(RepositoryError::Backend(format!("duplicate order id {}", order.id)));
        }
        orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Order> {
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("order {}", id)))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|order| status.map_or(true, |s| order.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        payment_details: Option<&PaymentDetails>,
    ) -> RepositoryResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&id) else {
            return Ok(None);
        };
        if order.status != expected {
            return Ok(None);
        }
        order.status = next;
        if let Some(details) = payment_details {
            order.payment_details = Some(details.clone());
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn set_payment_details(
        &self,
        id: Uuid,
        expected: OrderStatus,
        payment_details: &PaymentDetails,
    ) -> RepositoryResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&id) else {
            return Ok(None);
        };
        if order.status != expected {
            return Ok(None);
        }
        order.payment_details = Some(payment_details.clone());
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }

    async fn status_summary(&self) -> RepositoryResult<Vec<StatusSummary>> {
        let orders = self.orders.read().await;
        let mut by_status: HashMap<OrderStatus, (i64, i64)> = HashMap::new();
        for order in orders.values() {
            let entry = by_status.entry(order.status).or_insert((0, 0));
            entry.0 += 1;
            entry.1 = entry.1.saturating_add(order.total_amount);
        }

        Ok(by_status
            .into_iter()
            .map(|(status, (count, total_amount))| StatusSummary {
                status,
                count,
                total_amount,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: RwLock::new(map),
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get(&self, id: Uuid) -> RepositoryResult<Product> {
        self.products
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("product {}", id)))
    }

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn insert(&self, product: &Product) -> RepositoryResult<Product> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.products.read().await.len() as i64)
    }
}

/// Cart store with the same TTL semantics as the Redis store.
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<String, (Cart, Instant)>>,
    ttl: Duration,
}

impl InMemoryCartStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            carts: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load(&self, key: &str) -> RepositoryResult<Cart> {
        let carts = self.carts.read().await;
        match carts.get(key) {
            Some((cart, expires_at)) if *expires_at > Instant::now() => Ok(cart.clone()),
            _ => Ok(Cart::empty(key)),
        }
    }

    async fn save(&self, cart: &Cart) -> RepositoryResult<()> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(self.ttl)
            .ok_or_else(|| RepositoryError::Backend("cart ttl out of range".to_string()))?;

        let mut carts = self.carts.write().await;
        carts.retain(|_, (_, exp)| *exp > now);
        carts.insert(cart.key.clone(), (cart.clone(), expires_at));
        Ok(())
    }

    async fn clear(&self, key: &str) -> RepositoryResult<()> {
        self.carts.write().await.remove(key);
        Ok(())
    }
}
