use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ErrorBody;
use crate::domain::Cart;
use crate::error::AppError;
use crate::middleware::session::CartKey;
use crate::use_cases::CartAction;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub success: bool,
    pub cart: Cart,
    pub total_amount: i64,
    pub item_count: u64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            success: true,
            total_amount: cart.total(),
            item_count: cart.item_count(),
            cart,
        }
    }
}

#[utoipa::path(
    get,
    path = "/cart",
    params(("x-session-id" = String, Header, description = "Shopper session key")),
    responses(
        (status = 200, body = CartResponse),
        (status = 400, body = ErrorBody)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    CartKey(key): CartKey,
) -> Result<impl IntoResponse, AppError> {
    let cart = state.cart.view(&key).await?;
    Ok(Json(CartResponse::from(cart)))
}

#[utoipa::path(
    post,
    path = "/cart/add/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("x-session-id" = String, Header, description = "Shopper session key")
    ),
    responses(
        (status = 200, body = CartResponse),
        (status = 404, description = "Unknown product", body = ErrorBody)
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    CartKey(key): CartKey,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(product_id) = path?;
    let cart = state.cart.add(&key, product_id).await?;
    Ok(Json(CartResponse::from(cart)))
}

async fn adjust(
    state: AppState,
    key: String,
    product_id: Uuid,
    action: CartAction,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state.cart.apply(&key, product_id, action).await?;
    Ok(Json(CartResponse::from(cart)))
}

#[utoipa::path(
    post,
    path = "/cart/increment/{id}",
    params(("id" = Uuid, Path,), ("x-session-id" = String, Header,)),
    responses((status = 200, body = CartResponse)),
    tag = "Cart"
)]
pub async fn increment_item(
    State(state): State<AppState>,
    CartKey(key): CartKey,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CartResponse>, AppError> {
    let Path(product_id) = path?;
    adjust(state, key, product_id, CartAction::Increment).await
}

#[utoipa::path(
    post,
    path = "/cart/decrement/{id}",
    params(("id" = Uuid, Path,), ("x-session-id" = String, Header,)),
    responses((status = 200, description = "A line at quantity 1 is removed", body = CartResponse)),
    tag = "Cart"
)]
pub async fn decrement_item(
    State(state): State<AppState>,
    CartKey(key): CartKey,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CartResponse>, AppError> {
    let Path(product_id) = path?;
    adjust(state, key, product_id, CartAction::Decrement).await
}

#[utoipa::path(
    post,
    path = "/cart/remove/{id}",
    params(("id" = Uuid, Path,), ("x-session-id" = String, Header,)),
    responses((status = 200, body = CartResponse)),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    CartKey(key): CartKey,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CartResponse>, AppError> {
    let Path(product_id) = path?;
    adjust(state, key, product_id, CartAction::Remove).await
}
