//! HTTP API server for the bakery storefront.
//!
//! Public catalog and cart endpoints, checkout, customer order
//! history, and the admin back office, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{CartService, CatalogService, CheckoutService, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub catalog: CatalogService<S>,
    pub cart: CartService<S>,
    pub checkout: CheckoutService<S>,
    pub orders: OrderService<S>,
}

/// Creates the default application state over the given store.
pub fn create_default_state<S: Store + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        catalog: CatalogService::new(store.clone()),
        cart: CartService::new(store.clone()),
        checkout: CheckoutService::new(store.clone()),
        orders: OrderService::new(store),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Public catalog
        .route("/categories", get(routes::catalog::categories::<S>))
        .route("/products", get(routes::catalog::list::<S>))
        .route("/products/featured", get(routes::catalog::featured::<S>))
        .route("/products/{slug}", get(routes::catalog::get::<S>))
        // Cart
        .route("/cart", get(routes::cart::get::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/cart/items/{id}",
            put(routes::cart::update_item::<S>).delete(routes::cart::remove_item::<S>),
        )
        // Checkout and order history
        .route("/checkout", post(routes::checkout::place_order::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        // Back office
        .route("/admin/dashboard", get(routes::admin::dashboard::<S>))
        .route(
            "/admin/products",
            get(routes::admin::list_products::<S>).post(routes::admin::create_product::<S>),
        )
        .route(
            "/admin/products/{id}",
            get(routes::admin::get_product::<S>)
                .put(routes::admin::update_product::<S>)
                .delete(routes::admin::delete_product::<S>),
        )
        .route("/admin/categories", post(routes::admin::create_category::<S>))
        .route("/admin/orders", get(routes::admin::list_orders::<S>))
        .route("/admin/orders/{id}", get(routes::admin::get_order::<S>))
        .route(
            "/admin/orders/{id}/status",
            put(routes::admin::update_order_status::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
