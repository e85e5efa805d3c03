//! Cart endpoints.
//!
//! Available to both registered users and anonymous sessions; see
//! [`crate::identity`] for how the owner is resolved.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::{CartItemId, ProductId};
use domain::CartView;
use serde::{Deserialize, Serialize};
use store::{CartItem, Store};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            line_total_cents: item.line_total().cents(),
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub cart_id: String,
    pub items: Vec<CartItemResponse>,
    pub subtotal_cents: i64,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            cart_id: view.cart.id.to_string(),
            subtotal_cents: view.subtotal().cents(),
            items: view.items.into_iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// GET /cart — the owner's cart and its lines.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = identity::cart_owner(&headers)?;
    let view = state.cart.get_cart(&owner).await?;
    Ok(Json(view.into()))
}

/// POST /cart/items — add a product to the cart.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_item<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<(axum::http::StatusCode, Json<CartItemResponse>), ApiError> {
    let owner = identity::cart_owner(&headers)?;
    let item = state
        .cart
        .add_item(&owner, ProductId::from_uuid(req.product_id), req.quantity)
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(item.into())))
}

/// PUT /cart/items/{id} — set a line's quantity.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_item<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartItemResponse>, ApiError> {
    let owner = identity::cart_owner(&headers)?;
    let item = state
        .cart
        .update_item(&owner, CartItemId::from_uuid(id), req.quantity)
        .await?;
    Ok(Json(item.into()))
}

/// DELETE /cart/items/{id} — remove a line.
#[tracing::instrument(skip(state, headers))]
pub async fn remove_item<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    let owner = identity::cart_owner(&headers)?;
    state
        .cart
        .remove_item(&owner, CartItemId::from_uuid(id))
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
