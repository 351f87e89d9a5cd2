use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::ErrorBody;
use crate::error::AppError;
use crate::payment::{payment_methods, MomoIpnPayload};
use crate::use_cases::{
    BankTransferInstructions, BankingPaymentInput, IpnOutcome, MomoPaymentInput,
    MomoPaymentOutput, PaymentVerification,
};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/payment/methods",
    responses((status = 200, description = "Payment methods and transfer banks")),
    tag = "Payment"
)]
pub async fn methods() -> impl IntoResponse {
    Json(json!({ "success": true, "methods": payment_methods() }))
}

#[utoipa::path(
    post,
    path = "/payment/momo/create",
    request_body = MomoPaymentInput,
    responses(
        (status = 200, body = MomoPaymentOutput),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, description = "Order is not pending", body = ErrorBody),
        (status = 502, description = "MoMo unavailable or rejected the request", body = ErrorBody)
    ),
    tag = "Payment"
)]
pub async fn momo_create(
    State(state): State<AppState>,
    payload: Result<Json<MomoPaymentInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    Ok(Json(state.payments.create_momo(input).await?))
}

#[utoipa::path(
    post,
    path = "/payment/momo/ipn",
    request_body = MomoIpnPayload,
    responses(
        (status = 200, description = "Callback processed or ignored"),
        (status = 400, description = "Malformed payload or amount mismatch", body = ErrorBody),
        (status = 401, description = "Bad signature", body = ErrorBody),
        (status = 403, description = "Source address not allowed", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    tag = "Payment"
)]
pub async fn momo_ipn(
    State(state): State<AppState>,
    payload: Result<Json<MomoIpnPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let order_id = payload.order_id.clone();

    match state.reconciler.handle_momo_ipn(payload).await? {
        IpnOutcome::Applied(status) => {
            tracing::debug!(order_id = %order_id, status = %status, "IPN applied");
        }
        IpnOutcome::Duplicate(status) => {
            tracing::debug!(order_id = %order_id, status = %status, "IPN acknowledged without change");
        }
        IpnOutcome::Pending => {}
    }

    Ok(Json(json!({ "status": "OK" })))
}

#[utoipa::path(
    post,
    path = "/payment/banking/create",
    request_body = BankingPaymentInput,
    responses(
        (status = 200, body = BankTransferInstructions),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, description = "Order is not pending", body = ErrorBody)
    ),
    tag = "Payment"
)]
pub async fn banking_create(
    State(state): State<AppState>,
    payload: Result<Json<BankingPaymentInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    Ok(Json(state.payments.create_banking(input).await?))
}

#[utoipa::path(
    get,
    path = "/payment/verify/{order_id}",
    params(("order_id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, body = PaymentVerification),
        (status = 404, body = ErrorBody)
    ),
    tag = "Payment"
)]
pub async fn verify(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(order_id) = path?;
    Ok(Json(state.reconciler.verify(order_id).await?))
}
