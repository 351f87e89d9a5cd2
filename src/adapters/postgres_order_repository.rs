//! Postgres implementation of OrderRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{CustomerInfo, Order, OrderLine, OrderStatus, PaymentDetails};
use crate::ports::{OrderRepository, RepositoryError, RepositoryResult, StatusSummary};

const ORDER_COLUMNS: &str = "id, user_id, lines, customer_name, customer_email, customer_phone, \
    customer_address, customer_city, customer_note, payment_method, total_amount, status, \
    payment_details, created_at, updated_at";

/// Postgres-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, order: &Order) -> RepositoryResult<Order> {
        let sql = format!(
            r#"
            INSERT INTO orders (
                id, user_id, lines, customer_name, customer_email, customer_phone,
                customer_address, customer_city, customer_note, payment_method, total_amount,
                status, payment_details, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.id)
            .bind(order.user_id)
            .bind(Json(&order.lines))
            .bind(&order.customer.name)
            .bind(&order.customer.email)
            .bind(&order.customer.phone)
            .bind(&order.customer.address)
            .bind(&order.customer.city)
            .bind(&order.customer.note)
            .bind(order.payment_method.as_str())
            .bind(order.total_amount)
            .bind(order.status.as_str())
            .bind(order.payment_details.as_ref().map(Json))
            .bind(order.created_at)
            .bind(order.updated_at)
            .fetch_one(&self.pool)
            .await?;

        row.into_domain()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| RepositoryError::NotFound(format!("order {}", id)))?
            .into_domain()
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        payment_details: Option<&PaymentDetails>,
    ) -> RepositoryResult<Option<Order>> {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = $3,
                payment_details = COALESCE($4, payment_details),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .bind(payment_details.map(Json))
            .fetch_optional(&self.pool)
            .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    async fn set_payment_details(
        &self,
        id: Uuid,
        expected: OrderStatus,
        payment_details: &PaymentDetails,
    ) -> RepositoryResult<Option<Order>> {
        let sql = format!(
            r#"
            UPDATE orders
            SET payment_details = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(expected.as_str())
            .bind(Json(payment_details))
            .fetch_optional(&self.pool)
            .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn status_summary(&self) -> RepositoryResult<Vec<StatusSummary>> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)::BIGINT, COALESCE(SUM(total_amount), 0)::BIGINT
            FROM orders
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count, total_amount)| {
                Ok(StatusSummary {
                    status: status.parse().map_err(RepositoryError::Corrupt)?,
                    count,
                    total_amount,
                })
            })
            .collect()
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Option<Uuid>,
    lines: Json<Vec<OrderLine>>,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_address: String,
    customer_city: Option<String>,
    customer_note: Option<String>,
    payment_method: String,
    total_amount: i64,
    status: String,
    payment_details: Option<Json<PaymentDetails>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> RepositoryResult<Order> {
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            lines: self.lines.0,
            customer: CustomerInfo {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
                address: self.customer_address,
                city: self.customer_city,
                note: self.customer_note,
            },
            payment_method: self
                .payment_method
                .parse()
                .map_err(RepositoryError::Corrupt)?,
            total_amount: self.total_amount,
            status: self.status.parse().map_err(RepositoryError::Corrupt)?,
            payment_details: self.payment_details.map(|details| details.0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
