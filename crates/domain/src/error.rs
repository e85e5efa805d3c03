//! Domain error types.

use store::{OrderStatus, StoreError};
use thiserror::Error;

/// A single field-level validation failure, surfaced to the caller
/// alongside the field it applies to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Accumulated field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for a field.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Returns true if no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the recorded failures.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `Ok(())` if empty, otherwise wraps the failures in a
    /// [`DomainError::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for err in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Errors that can occur during domain operations.
///
/// All variants are recoverable at the request boundary.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or missing input, reported field by field.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The product is inactive or not available for purchase.
    #[error("Product {name:?} is not available")]
    Unavailable { name: String },

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// Checkout was attempted with no cart lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cross-owner access to an order or cart line.
    #[error("Access to this {0} is forbidden")]
    Forbidden(&'static str),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The requested status change is not permitted by the configured
    /// transition table.
    #[error("Cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl DomainError {
    /// Builds a `Validation` error for a single field.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(field, message);
        DomainError::Validation(errors)
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientStock {
                requested,
                available,
                ..
            } => DomainError::InsufficientStock {
                requested,
                available,
            },
            StoreError::NotFound { entity, .. } => DomainError::NotFound(entity),
            other => DomainError::Store(other),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
