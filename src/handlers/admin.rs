use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::ErrorBody;
use crate::domain::{Order, OrderStatus};
use crate::error::AppError;
use crate::use_cases::DashboardStats;
use crate::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OrderFilter {
    /// One of the order statuses; omitted means all.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|e: String| AppError::Validation(format!("status: {}", e)))
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    params(OrderFilter),
    responses(
        (status = 200, description = "Newest orders first", body = [Order]),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody)
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<OrderFilter>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(filter) = query?;
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;

    let orders = state.orders.list(status, filter.limit, filter.offset).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, body = Order),
        (status = 404, body = ErrorBody)
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    Ok(Json(state.orders.get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, body = Order),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, description = "Illegal transition or concurrent change", body = ErrorBody)
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let next = parse_status(&req.status)?;
    Ok(Json(state.orders.admin_transition(id, next).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, body = ErrorBody)
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    state.orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, body = DashboardStats),
        (status = 401, body = ErrorBody)
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.dashboard.stats().await?))
}
