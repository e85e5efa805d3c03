//! Shared types for the bakery storefront.
//!
//! Identifier newtypes, anonymous session tokens, and integer-cent money.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{
    CartId, CartItemId, CategoryId, OrderId, OrderItemId, ProductId, SessionToken, UserId,
};
