#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use storefront_core::adapters::{InMemoryCartStore, InMemoryOrderRepository, InMemoryProductCatalog};
use storefront_core::config::AllowedIps;
use storefront_core::domain::Product;
use storefront_core::middleware::auth::AdminKey;
use storefront_core::payment::{BankAccount, MomoClient, MomoIpnPayload, MomoSettings};
use storefront_core::{create_app, AppState, HttpSettings, Repositories};

pub const ADMIN_KEY: &str = "test-admin-key-0123456789";
pub const SESSION: &str = "shopper-1";

pub struct TestApp {
    pub app: Router,
    pub orders: Arc<InMemoryOrderRepository>,
    pub momo: MomoClient,
    pub shirt: Product,
    pub mug: Product,
}

pub fn momo_settings(endpoint: &str) -> MomoSettings {
    MomoSettings {
        endpoint: endpoint.to_string(),
        partner_code: "MOMOTEST".to_string(),
        access_key: "access".to_string(),
        secret_key: "secret".to_string(),
        redirect_url: "http://localhost:3000/payment/result".to_string(),
        ipn_url: "http://localhost:3000/payment/momo/ipn".to_string(),
        request_type: "captureWallet".to_string(),
        timeout_secs: 5,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_momo("http://127.0.0.1:9/v2/gateway/api/create")
}

pub fn spawn_app_with_momo(endpoint: &str) -> TestApp {
    let shirt = Product::new(
        "Ao thun".to_string(),
        100_000,
        None,
        "fashion".to_string(),
        "Cotton".to_string(),
    );
    let mug = Product::new(
        "Coc su".to_string(),
        45_000,
        Some("https://img.example/mug.png".to_string()),
        "home".to_string(),
        String::new(),
    );

    let orders = Arc::new(InMemoryOrderRepository::new());
    let repos = Repositories {
        orders: orders.clone(),
        catalog: Arc::new(InMemoryProductCatalog::with_products([
            shirt.clone(),
            mug.clone(),
        ])),
        carts: Arc::new(InMemoryCartStore::new(Duration::from_secs(60))),
    };
    let momo = MomoClient::new(momo_settings(endpoint));
    let state = AppState::new(
        repos,
        momo.clone(),
        BankAccount {
            account_number: "0123456789".to_string(),
            account_name: "CONG TY MERN".to_string(),
        },
        Vec::new(),
    );
    let app = create_app(
        state,
        HttpSettings {
            admin_key: AdminKey::new(ADMIN_KEY),
            ipn_allowed_ips: AllowedIps::Any,
            trusted_proxy_depth: 0,
            log_request_body: false,
            cors_allowed_origin: None,
        },
    );

    TestApp {
        app,
        orders,
        momo,
        shirt,
        mug,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-session-id", SESSION);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", ADMIN_KEY));
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn add_to_cart(&self, product: &Product, times: usize) {
        for _ in 0..times {
            let (status, _) = self
                .call(Method::POST, &format!("/cart/add/{}", product.id), None)
                .await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    /// Fills the cart and checks out; returns the created order JSON.
    pub async fn place_order(&self, method: &str) -> Value {
        self.add_to_cart(&self.shirt, 2).await;
        let (status, order) = self
            .call(Method::POST, "/checkout", Some(checkout_form(method)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "checkout failed: {}", order);
        order
    }

    pub fn signed_ipn(&self, order_id: &str, amount: i64, result_code: i64) -> MomoIpnPayload {
        let mut payload = MomoIpnPayload {
            partner_code: "MOMOTEST".to_string(),
            order_id: order_id.to_string(),
            request_id: "req-1".to_string(),
            amount,
            order_info: "Thanh toan don hang".to_string(),
            order_type: "momo_wallet".to_string(),
            trans_id: "4088878653".to_string(),
            result_code,
            message: "Successful.".to_string(),
            pay_type: "qr".to_string(),
            response_time: 1_700_000_000_000,
            extra_data: String::new(),
            signature: String::new(),
        };
        payload.signature = self.momo.sign_ipn(&payload).unwrap();
        payload
    }

    pub async fn post_ipn(&self, payload: &MomoIpnPayload) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/payment/momo/ipn")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(payload).unwrap()))
            .unwrap();
        self.send(request).await
    }
}

pub fn checkout_form(method: &str) -> Value {
    serde_json::json!({
        "name": "Nguyen Van A",
        "email": "khach@example.vn",
        "phone": "0901234567",
        "address": "1 Le Loi, Quan 1",
        "city": "Ho Chi Minh",
        "paymentMethod": method
    })
}
