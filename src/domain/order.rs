//! Order domain entity and its status machine.
//! Framework-agnostic representation of a placed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Paid,
    Failed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Paid,
        OrderStatus::Failed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Failed
        )
    }

    /// Statuses whose orders count towards revenue.
    pub fn is_revenue(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Shipped | OrderStatus::Delivered
        )
    }

    /// The static transition table. Method-specific edges live in [`Order::check_transition`].
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Paid)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Processing, Paid)
                | (Processing, Failed)
                | (Processing, Cancelled)
                | (Paid, Shipped)
                | (Paid, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown order status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Momo,
    Banking,
    Cod,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Momo, PaymentMethod::Banking, PaymentMethod::Cod];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Momo => "momo",
            PaymentMethod::Banking => "banking",
            PaymentMethod::Cod => "cod",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .iter()
            .find(|method| method.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown payment method '{}'", s))
    }
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionActor {
    Customer,
    PaymentProvider,
    Admin,
}

impl fmt::Display for TransitionActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionActor::Customer => f.write_str("customer"),
            TransitionActor::PaymentProvider => f.write_str("payment_provider"),
            TransitionActor::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{actor} cannot move order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub actor: TransitionActor,
}

/// Customer snapshot taken at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: String,
    /// Unit price in VND at the time the product entered the cart.
    pub unit_price: i64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub request_id: Option<String>,
    pub bank_id: Option<String>,
    pub transfer_content: Option<String>,
    pub amount: i64,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentDetails {
    pub fn new(method: PaymentMethod, amount: i64) -> Self {
        Self {
            method,
            transaction_id: None,
            request_id: None,
            bank_id: None,
            transfer_content: None,
            amount,
            paid_at: None,
        }
    }
}

/// Domain entity representing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub lines: Vec<OrderLine>,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_details: Option<PaymentDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a new pending order. The total is derived from the lines.
    pub fn new(
        user_id: Option<Uuid>,
        lines: Vec<OrderLine>,
        customer: CustomerInfo,
        payment_method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        let total_amount = lines_total(&lines);
        Self {
            id: Uuid::new_v4(),
            user_id,
            lines,
            customer,
            payment_method,
            total_amount,
            status: OrderStatus::Pending,
            payment_details: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks whether `actor` may move this order to `next`.
    pub fn check_transition(
        &self,
        next: OrderStatus,
        actor: TransitionActor,
    ) -> Result<(), TransitionError> {
        let from = self.status;
        let in_table = from.can_transition_to(next)
            || (self.payment_method == PaymentMethod::Cod
                && from == OrderStatus::Processing
                && next == OrderStatus::Shipped);

        let permitted = in_table
            && match actor {
                TransitionActor::Admin => true,
                TransitionActor::Customer => {
                    from == OrderStatus::Pending && next == OrderStatus::Cancelled
                }
                TransitionActor::PaymentProvider => {
                    matches!(from, OrderStatus::Pending | OrderStatus::Processing)
                        && matches!(next, OrderStatus::Paid | OrderStatus::Failed)
                }
            };

        if permitted {
            Ok(())
        } else {
            Err(TransitionError {
                from,
                to: next,
                actor,
            })
        }
    }
}

pub fn lines_total(lines: &[OrderLine]) -> i64 {
    lines
        .iter()
        .fold(0i64, |acc, line| acc.saturating_add(line.line_total()))
}
