use common::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The referenced entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A guarded stock decrement would have driven stock below zero.
    /// The enclosing transaction has been rolled back.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A product with this name already exists.
    #[error("A product named {0:?} already exists")]
    DuplicateProductName(String),

    /// A product with this slug already exists.
    #[error("A product with slug {0:?} already exists")]
    DuplicateProductSlug(String),

    /// A category with this slug already exists.
    #[error("A category with slug {0:?} already exists")]
    DuplicateCategorySlug(String),

    /// The generated order number collided with an existing order.
    /// Callers regenerate and retry.
    #[error("Order number {0} already exists")]
    DuplicateOrderNumber(String),
}

impl StoreError {
    /// Builds a `NotFound` error for the given entity and id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
