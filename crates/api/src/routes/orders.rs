//! Customer order history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::OrderView;
use serde::{Deserialize, Serialize};
use store::{DeliveryMethod, Order, OrderItem, OrderStatus, Page, Store};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity;
use crate::routes::catalog::PaginatedResponse;

const DEFAULT_PAGE_SIZE: u32 = 10;

// -- Request types --

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub product_price_cents: i64,
    pub quantity: u32,
    pub total_price_cents: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product_id.map(|id| id.to_string()),
            product_name: item.product_name,
            product_price_cents: item.product_price.cents(),
            quantity: item.quantity,
            total_price_cents: item.total_price.cents(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub tax_amount_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_amount_cents: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Present on detail responses, omitted from listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemResponse>>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number,
            status: order.status,
            subtotal_cents: order.subtotal.cents(),
            tax_amount_cents: order.tax_amount.cents(),
            delivery_fee_cents: order.delivery_fee.cents(),
            total_amount_cents: order.total_amount.cents(),
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            delivery_method: order.delivery_method,
            delivery_address: order.delivery_address,
            pickup_time: order.pickup_time,
            notes: order.notes,
            created_at: order.created_at,
            items: None,
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        let mut response = OrderResponse::from(view.order);
        response.items = Some(view.items.into_iter().map(Into::into).collect());
        response
    }
}

// -- Handlers --

/// GET /orders — the user's own orders, newest first.
#[tracing::instrument(skip(state, headers, params))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: axum::http::HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<OrderResponse>>, ApiError> {
    let user_id = identity::require_user(&headers)?;
    let page = Page::new(
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
    );
    let orders = state.orders.list_for_user(user_id, page).await?;
    Ok(Json(orders.into()))
}

/// GET /orders/{id} — one of the user's own orders, with items.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: axum::http::HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let user_id = identity::require_user(&headers)?;
    let view = state
        .orders
        .get_for_user(OrderId::from_uuid(id), user_id)
        .await?;
    Ok(Json(view.into()))
}
