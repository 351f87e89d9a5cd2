mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn test_health_without_dependencies() {
    let app = spawn_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = spawn_app();
    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/checkout"].is_object());
    assert!(body["paths"]["/payment/momo/ipn"].is_object());
    assert!(body["components"]["securitySchemes"]["admin_key"].is_object());
}

#[tokio::test]
async fn test_payment_methods() {
    let app = spawn_app();
    let (status, body) = app.call(Method::GET, "/payment/methods", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let ids: Vec<&str> = body["methods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["momo", "banking", "cod"]);
    assert!(!body["methods"][1]["banks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_products_listing_and_lookup() {
    let app = spawn_app();

    let (status, products) = app.call(Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products.as_array().unwrap().len(), 2);

    let (status, product) = app
        .call(Method::GET, &format!("/products/{}", app.mug.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["price"], 45_000);

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/products/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_creates_product() {
    let app = spawn_app();

    let (status, product) = app
        .admin(
            Method::POST,
            "/admin/products",
            Some(json!({ "name": "Non la", "price": 80000, "category": "fashion" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["name"], "Non la");

    let (status, _) = app
        .admin(
            Method::POST,
            "/admin/products",
            Some(json!({ "name": "Free", "price": 0, "category": "fashion" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, products) = app.call(Method::GET, "/products", None).await;
    assert_eq!(products.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_cart_requires_session_header() {
    let app = spawn_app();
    let request = Request::builder().uri("/cart").body(Body::empty()).unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_cart_quantity_adjustments() {
    let app = spawn_app();
    app.add_to_cart(&app.shirt, 1).await;
    app.add_to_cart(&app.mug, 1).await;

    let (status, cart) = app
        .call(Method::POST, &format!("/cart/increment/{}", app.shirt.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totalAmount"], 245_000);
    assert_eq!(cart["itemCount"], 3);

    // quantity 1 drops the line
    let (_, cart) = app
        .call(Method::POST, &format!("/cart/decrement/{}", app.mug.id), None)
        .await;
    assert_eq!(cart["cart"]["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["totalAmount"], 200_000);

    let (_, cart) = app
        .call(Method::POST, &format!("/cart/remove/{}", app.shirt.id), None)
        .await;
    assert_eq!(cart["cart"]["lines"].as_array().unwrap().len(), 0);
    assert_eq!(cart["totalAmount"], 0);
}

#[tokio::test]
async fn test_adding_unknown_product_is_not_found() {
    let app = spawn_app();

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/cart/add/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_carts_are_isolated_per_session() {
    let app = spawn_app();
    app.add_to_cart(&app.shirt, 1).await;

    let request = Request::builder()
        .uri("/cart")
        .header("x-session-id", "another-shopper")
        .body(Body::empty())
        .unwrap();
    let (status, cart) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_customer_order_lookup() {
    let app = spawn_app();
    let order = app.place_order("cod").await;

    let (status, fetched) = app
        .call(
            Method::GET,
            &format!("/orders/{}", order["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["customer"]["email"], "khach@example.vn");

    let (status, body) = app
        .call(Method::GET, "/orders/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_query_is_json_error() {
    let app = spawn_app();

    let (status, body) = app.call(Method::GET, "/products?limit=abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_malformed_cart_path_is_json_error() {
    let app = spawn_app();

    let (status, body) = app.call(Method::POST, "/cart/add/123", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}
