//! Back-office endpoints.
//!
//! Admin authorization is enforced upstream; these handlers trust that
//! the edge only forwards requests from authorized staff.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{CategoryId, Money, OrderId, ProductId};
use domain::{CategoryInput, ProductInput};
use serde::{Deserialize, Serialize};
use store::{OrderFilter, OrderStatus, Page, ProductStatus, SalesSummary, Store};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::catalog::{CategoryResponse, ListParams, PaginatedResponse, ProductResponse};
use crate::routes::orders::OrderResponse;

const PRODUCT_PAGE_SIZE: u32 = 10;
const ORDER_PAGE_SIZE: u32 = 15;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: u32,
    pub category_id: Uuid,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub weight_grams: Option<f64>,
    pub status: ProductStatus,
}

fn default_true() -> bool {
    true
}

impl From<ProductPayload> for ProductInput {
    fn from(payload: ProductPayload) -> Self {
        ProductInput {
            name: payload.name,
            description: payload.description,
            ingredients: payload.ingredients,
            price: Money::from_cents(payload.price_cents),
            stock_quantity: payload.stock_quantity,
            category_id: CategoryId::from_uuid(payload.category_id),
            is_active: payload.is_active,
            is_featured: payload.is_featured,
            weight_grams: payload.weight_grams,
            status: payload.status,
        }
    }
}

#[derive(Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Deserialize)]
pub struct OrderListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct DashboardResponse {
    pub total_revenue_cents: i64,
    pub today_revenue_cents: i64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub active_products: u64,
    pub low_stock_products: u64,
}

impl From<SalesSummary> for DashboardResponse {
    fn from(summary: SalesSummary) -> Self {
        Self {
            total_revenue_cents: summary.total_revenue.cents(),
            today_revenue_cents: summary.today_revenue.cents(),
            total_orders: summary.total_orders,
            pending_orders: summary.pending_orders,
            active_products: summary.active_products,
            low_stock_products: summary.low_stock_products,
        }
    }
}

// -- Handlers --

/// GET /admin/dashboard — aggregate sales figures.
#[tracing::instrument(skip(state))]
pub async fn dashboard<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let summary = state.orders.sales_summary().await?;
    Ok(Json(summary.into()))
}

/// GET /admin/products — all products, inactive included.
#[tracing::instrument(skip(state, params))]
pub async fn list_products<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<ProductResponse>>, ApiError> {
    let page = params.page(PRODUCT_PAGE_SIZE);
    let products = state
        .catalog
        .list_all_products(
            params.search,
            params.category_id.map(CategoryId::from_uuid),
            page,
        )
        .await?;
    Ok(Json(products.into()))
}

/// POST /admin/products — create a product.
#[tracing::instrument(skip(state, payload))]
pub async fn create_product<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<ProductPayload>,
) -> Result<(axum::http::StatusCode, Json<ProductResponse>), ApiError> {
    let product = state.catalog.create_product(payload.into()).await?;
    Ok((axum::http::StatusCode::CREATED, Json(product.into())))
}

/// GET /admin/products/{id} — product detail.
#[tracing::instrument(skip(state))]
pub async fn get_product<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(ProductId::from_uuid(id)).await?;
    Ok(Json(product.into()))
}

/// PUT /admin/products/{id} — update a product.
#[tracing::instrument(skip(state, payload))]
pub async fn update_product<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog
        .update_product(ProductId::from_uuid(id), payload.into())
        .await?;
    Ok(Json(product.into()))
}

/// DELETE /admin/products/{id} — delete a product.
#[tracing::instrument(skip(state))]
pub async fn delete_product<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    state
        .catalog
        .delete_product(ProductId::from_uuid(id))
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// POST /admin/categories — create a category.
#[tracing::instrument(skip(state, payload))]
pub async fn create_category<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<CategoryPayload>,
) -> Result<(axum::http::StatusCode, Json<CategoryResponse>), ApiError> {
    let category = state
        .catalog
        .create_category(CategoryInput {
            name: payload.name,
            is_active: payload.is_active,
            sort_order: payload.sort_order,
        })
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(category.into())))
}

/// GET /admin/orders — all orders, filtered and paginated.
#[tracing::instrument(skip(state, params))]
pub async fn list_orders<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<PaginatedResponse<OrderResponse>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            OrderStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown order status: {s}")))
        })
        .transpose()?;

    let filter = OrderFilter {
        search: params.search,
        status,
    };
    let page = Page::new(
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(ORDER_PAGE_SIZE),
    );
    let orders = state.orders.list_all(&filter, page).await?;
    Ok(Json(orders.into()))
}

/// GET /admin/orders/{id} — order detail with items.
#[tracing::instrument(skip(state))]
pub async fn get_order<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let view = state.orders.get(OrderId::from_uuid(id)).await?;
    Ok(Json(view.into()))
}

/// PUT /admin/orders/{id}/status — set an order's status.
#[tracing::instrument(skip(state, req))]
pub async fn update_order_status<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let status = OrderStatus::parse(&req.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown order status: {}", req.status)))?;
    let order = state
        .orders
        .update_status(OrderId::from_uuid(id), status)
        .await?;
    Ok(Json(order.into()))
}
