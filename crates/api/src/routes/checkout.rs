//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use domain::{CheckoutRequest, DomainError, OrderView};
use serde::Deserialize;
use store::{DeliveryMethod, Store};

use crate::AppState;
use crate::error::ApiError;
use crate::identity;
use crate::routes::orders::OrderResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct CheckoutPayload {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_method: String,
    pub delivery_address: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub notes: Option<String>,
}

impl CheckoutPayload {
    fn into_request(self) -> Result<CheckoutRequest, DomainError> {
        let delivery_method = DeliveryMethod::parse(&self.delivery_method).ok_or_else(|| {
            DomainError::invalid("delivery_method", "Please select pickup or delivery.")
        })?;
        Ok(CheckoutRequest {
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            delivery_method,
            delivery_address: self.delivery_address,
            pickup_time: self.pickup_time,
            notes: self.notes,
        })
    }
}

// -- Handlers --

/// POST /checkout — place an order from the user's cart.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn place_order<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutPayload>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let user_id = identity::require_user(&headers)?;
    let request = payload.into_request()?;

    let (order, items) = state.checkout.place_order(user_id, request).await?;
    let view = OrderView { order, items };
    Ok((axum::http::StatusCode::CREATED, Json(view.into())))
}
