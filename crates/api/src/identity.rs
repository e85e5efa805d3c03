//! Request identity helpers.
//!
//! Authentication happens upstream of this service; the edge forwards
//! the resolved identity as headers. `X-User-Id` carries a registered
//! user's UUID, `X-Session-Token` an anonymous session token. Admin
//! routes additionally rely on the edge to have enforced authorization
//! before forwarding.

use axum::http::HeaderMap;
use common::UserId;
use store::CartOwner;
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";
pub const SESSION_HEADER: &str = "x-session-token";

/// Resolves the cart owner from the forwarded identity headers.
///
/// Exactly one of the two headers must be present; rather than
/// silently preferring one, sending both is rejected outright.
pub fn cart_owner(headers: &HeaderMap) -> Result<CartOwner, ApiError> {
    let user = header_str(headers, USER_HEADER)?;
    let session = header_str(headers, SESSION_HEADER)?;

    match (user, session) {
        (Some(_), Some(_)) => Err(ApiError::BadRequest(format!(
            "Provide either {USER_HEADER} or {SESSION_HEADER}, not both"
        ))),
        (Some(user), None) => Ok(CartOwner::User(parse_user_id(user)?)),
        (None, Some(session)) => Ok(CartOwner::Session(session.into())),
        (None, None) => Err(ApiError::Unauthorized(format!(
            "Missing {USER_HEADER} or {SESSION_HEADER}"
        ))),
    }
}

/// Requires a registered user identity (checkout and order history).
pub fn require_user(headers: &HeaderMap) -> Result<UserId, ApiError> {
    match header_str(headers, USER_HEADER)? {
        Some(value) => parse_user_id(value),
        None => Err(ApiError::Unauthorized(format!("Missing {USER_HEADER}"))),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{name} is not valid UTF-8"))),
        None => Ok(None),
    }
}

fn parse_user_id(value: &str) -> Result<UserId, ApiError> {
    let uuid = Uuid::parse_str(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {USER_HEADER}: {e}")))?;
    Ok(UserId::from_uuid(uuid))
}
