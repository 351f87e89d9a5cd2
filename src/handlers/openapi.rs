use axum::{response::IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::{admin, cart, checkout, orders, payment, products};
use crate::domain::{
    Cart, CartLine, CustomerInfo, Order, OrderLine, OrderStatus, PaymentDetails, PaymentMethod,
    Product,
};
use crate::ports::StatusSummary;
use crate::use_cases::{
    BankTransferInstructions, BankingPaymentInput, CheckoutInput, CheckoutSummary,
    DashboardStats, MomoPaymentInput, MomoPaymentOutput, NewProduct, PaymentVerification,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::health,
        products::list_products,
        products::get_product,
        products::create_product,
        cart::get_cart,
        cart::add_item,
        cart::increment_item,
        cart::decrement_item,
        cart::remove_item,
        checkout::summary,
        checkout::place_order,
        orders::get_order,
        orders::cancel_order,
        payment::methods,
        payment::momo_create,
        payment::momo_ipn,
        payment::banking_create,
        payment::verify,
        admin::list_orders,
        admin::get_order,
        admin::update_order_status,
        admin::delete_order,
        admin::stats,
    ),
    components(schemas(
        super::ErrorBody,
        Product,
        NewProduct,
        Cart,
        CartLine,
        cart::CartResponse,
        CheckoutInput,
        CheckoutSummary,
        Order,
        OrderLine,
        OrderStatus,
        CustomerInfo,
        PaymentMethod,
        PaymentDetails,
        MomoPaymentInput,
        MomoPaymentOutput,
        BankingPaymentInput,
        BankTransferInstructions,
        PaymentVerification,
        admin::StatusUpdateRequest,
        DashboardStats,
        StatusSummary,
    )),
    modifiers(&AdminKeyScheme),
    tags(
        (name = "Products", description = "Catalog reads"),
        (name = "Cart", description = "Session cart keyed by x-session-id"),
        (name = "Checkout", description = "Order placement"),
        (name = "Orders", description = "Customer order access"),
        (name = "Payment", description = "MoMo wallet and bank transfer"),
        (name = "Admin", description = "Back-office operations"),
    )
)]
pub struct ApiDoc;

struct AdminKeyScheme;

impl Modify for AdminKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
