//! Business rules and services for the bakery storefront.
//!
//! Each service wraps a [`store::Store`] implementation and enforces
//! the storefront's invariants:
//! - [`catalog::CatalogService`] — product/category queries and admin CRUD
//! - [`cart::CartService`] — cart line mutations with stock-bound validation
//! - [`checkout::CheckoutService`] — the order placement workflow
//! - [`order::OrderService`] — the order query surface and status updates

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod order;

pub use cart::{CartService, CartView, MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY};
pub use catalog::{CatalogService, CategoryInput, ProductInput, slugify};
pub use checkout::{CheckoutRequest, CheckoutService, DELIVERY_FEE, TAX_RATE_PERCENT};
pub use error::{DomainError, FieldError, ValidationErrors};
pub use order::{OrderService, OrderView, StatusTransitions};
