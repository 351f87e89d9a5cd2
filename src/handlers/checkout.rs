use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::ErrorBody;
use crate::domain::Order;
use crate::error::AppError;
use crate::middleware::session::CartKey;
use crate::use_cases::{CheckoutInput, CheckoutSummary};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/checkout",
    params(("x-session-id" = String, Header, description = "Shopper session key")),
    responses((status = 200, body = CheckoutSummary)),
    tag = "Checkout"
)]
pub async fn summary(
    State(state): State<AppState>,
    CartKey(key): CartKey,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.checkout.summary(&key).await?))
}

#[utoipa::path(
    post,
    path = "/checkout",
    params(("x-session-id" = String, Header, description = "Shopper session key")),
    request_body = CheckoutInput,
    responses(
        (status = 201, description = "Order created, cart cleared", body = Order),
        (status = 400, description = "Invalid form or empty cart", body = ErrorBody)
    ),
    tag = "Checkout"
)]
pub async fn place_order(
    State(state): State<AppState>,
    CartKey(key): CartKey,
    payload: Result<Json<CheckoutInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let order = state.checkout.execute(&key, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
