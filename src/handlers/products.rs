use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::{ErrorBody, Pagination};
use crate::domain::Product;
use crate::error::AppError;
use crate::use_cases::NewProduct;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/products",
    params(Pagination),
    responses((status = 200, description = "Newest products first", body = [Product])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(pagination) = query?;
    let products = state
        .catalog
        .list(pagination.limit, pagination.offset)
        .await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, body = Product),
        (status = 404, body = ErrorBody)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    Ok(Json(state.catalog.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/products",
    request_body = NewProduct,
    responses(
        (status = 201, body = Product),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody)
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let product = state.catalog.create(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}
