//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let store = InMemoryStore::new();
    let state = api::create_default_state(store);
    api::create_app(state, get_metrics_handle())
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    session: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    if let Some(session) = session {
        builder = builder.header("x-session-token", session);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Creates a category and a product through the admin endpoints,
/// returning the product's id and slug.
async fn seed_product(app: &axum::Router, name: &str, price_cents: i64, stock: u32) -> (String, String) {
    let (status, category) = send(
        app,
        "POST",
        "/admin/categories",
        None,
        None,
        Some(serde_json::json!({ "name": "Breads" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{category}");
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, product) = send(
        app,
        "POST",
        "/admin/products",
        None,
        None,
        Some(serde_json::json!({
            "name": name,
            "price_cents": price_cents,
            "stock_quantity": stock,
            "category_id": category_id,
            "status": "available",
            "is_featured": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    (
        product["id"].as_str().unwrap().to_string(),
        product["slug"].as_str().unwrap().to_string(),
    )
}

fn pickup_checkout_body() -> serde_json::Value {
    let pickup_time = chrono::Utc::now() + chrono::Duration::hours(2);
    serde_json::json!({
        "customer_name": "Jane Doe",
        "customer_email": "jane@example.com",
        "customer_phone": "555-0100",
        "delivery_method": "pickup",
        "pickup_time": pickup_time.to_rfc3339(),
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = send(&app, "GET", "/health", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_catalog_listing_and_slug_lookup() {
    let app = setup();
    let (_, slug) = seed_product(&app, "Sourdough", 650, 10).await;

    let (status, json) = send(&app, "GET", "/products", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["name"], "Sourdough");

    let (status, json) = send(&app, "GET", &format!("/products/{slug}"), None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["price_cents"], 650);

    let (status, json) = send(&app, "GET", "/products/featured", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/products/no-such-bread", None, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_requires_identity() {
    let app = setup();
    let (status, _) = send(&app, "GET", "/cart", None, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_cart_add_and_update() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 10).await;

    let (status, item) = send(
        &app,
        "POST",
        "/cart/items",
        None,
        Some("sess-1"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["quantity"], 2);
    let item_id = item["id"].as_str().unwrap().to_string();

    // Re-adding merges into the same line.
    let (status, item) = send(
        &app,
        "POST",
        "/cart/items",
        None,
        Some("sess-1"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["quantity"], 5);

    let (status, cart) = send(&app, "GET", "/cart", None, Some("sess-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["subtotal_cents"], 650 * 5);

    // Another session cannot touch the line.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/cart/items/{item_id}"),
        None,
        Some("sess-2"),
        Some(serde_json::json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/cart/items/{item_id}"),
        None,
        Some("sess-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_add_to_cart_over_stock_conflicts() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 3).await;

    let (status, json) = send(
        &app,
        "POST",
        "/cart/items",
        None,
        Some("sess-1"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));

    let (_, cart) = send(&app, "GET", "/cart", None, Some("sess-1"), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_happy_path() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 10).await;
    let user = Uuid::new_v4().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/cart/items",
        Some(&user),
        None,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, order) = send(
        &app,
        "POST",
        "/checkout",
        Some(&user),
        None,
        Some(pickup_checkout_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["subtotal_cents"], 1300);
    assert_eq!(order["tax_amount_cents"], 104);
    assert_eq!(order["delivery_fee_cents"], 0);
    assert_eq!(order["total_amount_cents"], 1404);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    let order_number = order["order_number"].as_str().unwrap();
    assert_eq!(order_number.len(), 12);
    assert!(order_number.starts_with("MB"));

    // Stock decremented, cart emptied.
    let (_, product) = send(
        &app,
        "GET",
        &format!("/admin/products/{product_id}"),
        None,
        None,
        None,
    )
    .await;
    assert_eq!(product["stock_quantity"], 8);

    let (_, cart) = send(&app, "GET", "/cart", Some(&user), None, None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    // The order shows up in the customer's history.
    let (status, listing) = send(&app, "GET", "/orders", Some(&user), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn test_checkout_with_delivery_fee() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 10).await;
    let user = Uuid::new_v4().to_string();

    send(
        &app,
        "POST",
        "/cart/items",
        Some(&user),
        None,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;

    let mut body = pickup_checkout_body();
    body["delivery_method"] = "delivery".into();
    body["delivery_address"] = "12 Rye Lane".into();
    let (status, order) = send(&app, "POST", "/checkout", Some(&user), None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["delivery_fee_cents"], 500);
    assert_eq!(order["total_amount_cents"], 1904);
}

#[tokio::test]
async fn test_checkout_validation_reports_fields() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 10).await;
    let user = Uuid::new_v4().to_string();

    send(
        &app,
        "POST",
        "/cart/items",
        Some(&user),
        None,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 1 })),
    )
    .await;

    // Delivery without an address.
    let mut body = pickup_checkout_body();
    body["delivery_method"] = "delivery".into();
    let (status, json) = send(&app, "POST", "/checkout", Some(&user), None, Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["errors"][0]["field"], "delivery_address");

    // The failed attempt left the cart alone.
    let (_, cart) = send(&app, "GET", "/cart", Some(&user), None, None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_requires_user_and_items() {
    let app = setup();

    let (status, _) = send(
        &app,
        "POST",
        "/checkout",
        None,
        None,
        Some(pickup_checkout_body()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = Uuid::new_v4().to_string();
    let (status, json) = send(
        &app,
        "POST",
        "/checkout",
        Some(&user),
        None,
        Some(pickup_checkout_body()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Cart is empty");
}

#[tokio::test]
async fn test_cross_owner_order_access_is_forbidden() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 10).await;
    let alice = Uuid::new_v4().to_string();
    let bob = Uuid::new_v4().to_string();

    send(
        &app,
        "POST",
        "/cart/items",
        Some(&alice),
        None,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 1 })),
    )
    .await;
    let (_, order) = send(
        &app,
        "POST",
        "/checkout",
        Some(&alice),
        None,
        Some(pickup_checkout_body()),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "GET",
        &format!("/orders/{order_id}"),
        Some(&bob),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/orders/{order_id}"),
        Some(&alice),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_order_management() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 10).await;
    let user = Uuid::new_v4().to_string();

    send(
        &app,
        "POST",
        "/cart/items",
        Some(&user),
        None,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 1 })),
    )
    .await;
    let (_, order) = send(
        &app,
        "POST",
        "/checkout",
        Some(&user),
        None,
        Some(pickup_checkout_body()),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Admin sees the order regardless of owner.
    let (status, listing) = send(&app, "GET", "/admin/orders", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);

    let (status, listing) = send(
        &app,
        "GET",
        "/admin/orders?search=jane@example.com",
        None,
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);

    // Status update.
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/admin/orders/{order_id}/status"),
        None,
        None,
        Some(serde_json::json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "confirmed");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/orders/{order_id}/status"),
        None,
        None,
        Some(serde_json::json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listing) = send(
        &app,
        "GET",
        "/admin/orders?status=confirmed",
        None,
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn test_admin_dashboard_reflects_orders() {
    let app = setup();
    let (product_id, _) = seed_product(&app, "Sourdough", 650, 3).await;
    let user = Uuid::new_v4().to_string();

    send(
        &app,
        "POST",
        "/cart/items",
        Some(&user),
        None,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    send(
        &app,
        "POST",
        "/checkout",
        Some(&user),
        None,
        Some(pickup_checkout_body()),
    )
    .await;

    let (status, dashboard) = send(&app, "GET", "/admin/dashboard", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_orders"], 1);
    assert_eq!(dashboard["pending_orders"], 1);
    assert_eq!(dashboard["total_revenue_cents"], 1404);
    // Stock dropped to 1, below the low-stock threshold.
    assert_eq!(dashboard["low_stock_products"], 1);
}

#[tokio::test]
async fn test_admin_product_validation() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/admin/products",
        None,
        None,
        Some(serde_json::json!({
            "name": "",
            "price_cents": 0,
            "stock_quantity": 5,
            "category_id": Uuid::new_v4().to_string(),
            "status": "available"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"category_id"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
