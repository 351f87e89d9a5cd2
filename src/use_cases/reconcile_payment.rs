//! Payment reconciliation: applies MoMo IPN callbacks and serves the verify call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Order, OrderStatus, PaymentDetails, PaymentMethod, TransitionActor};
use crate::error::AppError;
use crate::payment::{MomoClient, MomoIpnPayload, MomoOutcome};
use crate::ports::OrderRepository;

/// What an accepted IPN did to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpnOutcome {
    /// The order moved to this status.
    Applied(OrderStatus),
    /// The order was already past the provider's reach; nothing was written.
    Duplicate(OrderStatus),
    /// Payment still running at the provider.
    Pending,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub success: bool,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    pub payment_details: Option<PaymentDetails>,
}

impl From<Order> for PaymentVerification {
    fn from(order: Order) -> Self {
        Self {
            success: true,
            order_id: order.id,
            status: order.status,
            payment_method: order.payment_method,
            total_amount: order.total_amount,
            payment_details: order.payment_details,
        }
    }
}

#[derive(Clone)]
pub struct PaymentReconciler {
    orders: Arc<dyn OrderRepository>,
    momo: MomoClient,
}

impl PaymentReconciler {
    pub fn new(orders: Arc<dyn OrderRepository>, momo: MomoClient) -> Self {
        Self { orders, momo }
    }

    pub async fn handle_momo_ipn(&self, payload: MomoIpnPayload) -> Result<IpnOutcome, AppError> {
        if !self.momo.verify_ipn(&payload) {
            tracing::warn!(order_id = %payload.order_id, "Rejected MoMo IPN with invalid signature");
            return Err(AppError::Unauthorized("invalid IPN signature".to_string()));
        }

        let order_id = Uuid::parse_str(&payload.order_id)
            .map_err(|_| AppError::BadRequest(format!("malformed orderId '{}'", payload.order_id)))?;
        let order = self.orders.get_by_id(order_id).await?;

        let target = match payload.outcome() {
            MomoOutcome::InProgress => {
                tracing::info!(order_id = %order.id, result_code = payload.result_code, "MoMo payment still in progress");
                return Ok(IpnOutcome::Pending);
            }
            MomoOutcome::Success => OrderStatus::Paid,
            MomoOutcome::Failure => OrderStatus::Failed,
        };

        if order.check_transition(target, TransitionActor::PaymentProvider).is_err() {
            tracing::info!(
                order_id = %order.id,
                status = %order.status,
                result_code = payload.result_code,
                "Ignoring IPN for settled order"
            );
            return Ok(IpnOutcome::Duplicate(order.status));
        }

        if target == OrderStatus::Paid && payload.amount != order.total_amount {
            tracing::warn!(
                order_id = %order.id,
                expected = order.total_amount,
                received = payload.amount,
                "MoMo IPN amount mismatch"
            );
            return Err(AppError::BadRequest(format!(
                "amount {} does not match order total {}",
                payload.amount, order.total_amount
            )));
        }

        let details = PaymentDetails {
            method: PaymentMethod::Momo,
            transaction_id: Some(payload.trans_id.clone()),
            request_id: Some(payload.request_id.clone()),
            bank_id: None,
            transfer_content: None,
            amount: payload.amount,
            paid_at: (target == OrderStatus::Paid).then(|| paid_at(payload.response_time)),
        };

        match self
            .orders
            .update_status(order.id, order.status, target, Some(&details))
            .await?
        {
            Some(updated) => {
                tracing::info!(
                    order_id = %updated.id,
                    status = %updated.status,
                    trans_id = %payload.trans_id,
                    "Applied MoMo IPN"
                );
                Ok(IpnOutcome::Applied(updated.status))
            }
            None => {
                // Lost the race; a concurrent delivery may have settled it already.
                let current = self.orders.get_by_id(order.id).await?;
                if current
                    .check_transition(target, TransitionActor::PaymentProvider)
                    .is_err()
                {
                    Ok(IpnOutcome::Duplicate(current.status))
                } else {
                    Err(AppError::Conflict(format!(
                        "order {} changed while applying IPN",
                        order.id
                    )))
                }
            }
        }
    }

    pub async fn verify(&self, order_id: Uuid) -> Result<PaymentVerification, AppError> {
        let order = self.orders.get_by_id(order_id).await?;
        Ok(order.into())
    }
}

fn paid_at(response_time_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(response_time_ms).unwrap_or_else(Utc::now)
}
