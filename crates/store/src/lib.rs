//! Relational persistence layer for the bakery storefront.
//!
//! Defines the entity records, the [`Store`] trait, and two
//! implementations: [`InMemoryStore`] for tests and development, and
//! [`PostgresStore`] backed by sqlx. The transactional checkout
//! primitive ([`Store::place_order`]) lives here so that order
//! creation, stock decrements, and cart clearing commit or roll back
//! as one unit.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{
    Cart, CartItem, CartOwner, Category, DeliveryMethod, Order, OrderItem, OrderStatus, Product,
    ProductStatus,
};
pub use postgres::PostgresStore;
pub use query::{OrderFilter, Page, Paginated, ProductFilter, SalesSummary};
pub use store::{LOW_STOCK_THRESHOLD, Store};
