pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod payment;
pub mod ports;
pub mod use_cases;
pub mod utils;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{AllowedIps, Config};
use crate::health::HealthCheck;
use crate::middleware::auth::{admin_auth, AdminKey};
use crate::middleware::ip_filter::IpFilterLayer;
use crate::middleware::request_logger::{request_logger_middleware, RequestLogSettings};
use crate::middleware::session::SESSION_HEADER;
use crate::payment::{BankAccount, MomoClient};
use crate::ports::{CartStore, OrderRepository, ProductCatalog};
use crate::use_cases::{
    CartService, Catalog, Checkout, Dashboard, OrderManager, PaymentInitiator,
    PaymentReconciler,
};

/// Storage backends the use cases run against.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderRepository>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub carts: Arc<dyn CartStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub cart: CartService,
    pub checkout: Checkout,
    pub payments: PaymentInitiator,
    pub reconciler: PaymentReconciler,
    pub orders: OrderManager,
    pub dashboard: Dashboard,
    pub health_checks: Arc<[HealthCheck]>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        momo: MomoClient,
        bank_account: BankAccount,
        health_checks: Vec<HealthCheck>,
    ) -> Self {
        Self {
            catalog: Catalog::new(repos.catalog.clone()),
            cart: CartService::new(repos.carts.clone(), repos.catalog.clone()),
            checkout: Checkout::new(repos.orders.clone(), repos.carts.clone()),
            payments: PaymentInitiator::new(repos.orders.clone(), momo.clone(), bank_account),
            reconciler: PaymentReconciler::new(repos.orders.clone(), momo),
            orders: OrderManager::new(repos.orders.clone()),
            dashboard: Dashboard::new(repos.orders, repos.catalog),
            health_checks: health_checks.into(),
            start_time: Instant::now(),
        }
    }
}

/// Router-level knobs taken from [`Config`].
#[derive(Clone)]
pub struct HttpSettings {
    pub admin_key: AdminKey,
    pub ipn_allowed_ips: AllowedIps,
    pub trusted_proxy_depth: usize,
    pub log_request_body: bool,
    pub cors_allowed_origin: Option<String>,
}

impl HttpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            admin_key: AdminKey::new(config.admin_api_key.as_str()),
            ipn_allowed_ips: config.momo_ipn_allowed_ips.clone(),
            trusted_proxy_depth: config.trusted_proxy_depth,
            log_request_body: config.log_request_body,
            cors_allowed_origin: config.cors_allowed_origin.clone(),
        }
    }
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(value) => AllowOrigin::exact(value),
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(SESSION_HEADER),
        ])
}

pub fn create_app(state: AppState, settings: HttpSettings) -> Router {
    let admin = Router::new()
        .route("/orders", get(handlers::admin::list_orders))
        .route(
            "/orders/:id",
            get(handlers::admin::get_order).delete(handlers::admin::delete_order),
        )
        .route("/orders/:id/status", patch(handlers::admin::update_order_status))
        .route("/stats", get(handlers::admin::stats))
        .route("/products", post(handlers::products::create_product))
        .layer(axum::middleware::from_fn_with_state(
            settings.admin_key.clone(),
            admin_auth,
        ));

    let ipn = Router::new()
        .route("/payment/momo/ipn", post(handlers::payment::momo_ipn))
        .layer(IpFilterLayer::new(
            settings.ipn_allowed_ips.clone(),
            settings.trusted_proxy_depth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(handlers::openapi::openapi_json))
        .route("/products", get(handlers::products::list_products))
        .route("/products/:id", get(handlers::products::get_product))
        .route("/cart", get(handlers::cart::get_cart))
        .route("/cart/add/:id", post(handlers::cart::add_item))
        .route("/cart/increment/:id", post(handlers::cart::increment_item))
        .route("/cart/decrement/:id", post(handlers::cart::decrement_item))
        .route("/cart/remove/:id", post(handlers::cart::remove_item))
        .route(
            "/checkout",
            get(handlers::checkout::summary).post(handlers::checkout::place_order),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order))
        .route("/payment/methods", get(handlers::payment::methods))
        .route("/payment/momo/create", post(handlers::payment::momo_create))
        .route("/payment/banking/create", post(handlers::payment::banking_create))
        .route("/payment/verify/:order_id", get(handlers::payment::verify))
        .merge(ipn)
        .nest("/admin", admin)
        .layer(axum::middleware::from_fn_with_state(
            RequestLogSettings {
                log_body: settings.log_request_body,
            },
            request_logger_middleware,
        ))
        .layer(cors_layer(settings.cors_allowed_origin.as_deref()))
        .with_state(state)
}
