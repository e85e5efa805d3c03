//! Entity records persisted by the store.

use chrono::{DateTime, Utc};
use common::{
    CartId, CartItemId, CategoryId, Money, OrderId, OrderItemId, ProductId, SessionToken, UserId,
};
use serde::{Deserialize, Serialize};

/// Availability status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Product can be purchased.
    #[default]
    Available,

    /// Product is temporarily sold out.
    OutOfStock,

    /// Product is no longer made.
    Discontinued,
}

impl ProductStatus {
    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::OutOfStock => "out_of_stock",
            ProductStatus::Discontinued => "discontinued",
        }
    }

    /// Parses a status from its database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ProductStatus::Available),
            "out_of_stock" => Some(ProductStatus::OutOfStock),
            "discontinued" => Some(ProductStatus::Discontinued),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL-safe identifier derived from the name. Unique.
    pub slug: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    /// Unit price. Always positive.
    pub price: Money,
    pub stock_quantity: u32,
    pub category_id: CategoryId,
    pub is_active: bool,
    pub is_featured: bool,
    /// Weight in grams.
    pub weight_grams: Option<f64>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns true if the product can be added to a cart.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.status == ProductStatus::Available
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub sort_order: i32,
}

/// The owner of a cart: a registered user or an anonymous session.
///
/// Exactly one identity is present by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOwner {
    User(UserId),
    Session(SessionToken),
}

impl CartOwner {
    /// Returns the user id if this cart belongs to a registered user.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            CartOwner::User(id) => Some(*id),
            CartOwner::Session(_) => None,
        }
    }

    /// Returns the session token if this cart belongs to an anonymous session.
    pub fn session_token(&self) -> Option<&SessionToken> {
        match self {
            CartOwner::User(_) => None,
            CartOwner::Session(token) => Some(token),
        }
    }
}

impl std::fmt::Display for CartOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartOwner::User(id) => write!(f, "user:{id}"),
            CartOwner::Session(token) => write!(f, "session:{token}"),
        }
    }
}

/// A shopping cart. Created lazily on first interaction and reused;
/// its lines are deleted after a successful checkout, the cart row
/// itself persists empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub owner: CartOwner,
    pub created_at: DateTime<Utc>,
}

/// One line in a cart: a product, a quantity, and the unit price
/// frozen at the time the line was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price snapshot; not re-read from the product later.
    pub unit_price: Money,
    /// Drives insertion ordering of cart lines.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Returns the line total (unit_price * quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// How an order is handed to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

impl DeliveryMethod {
    /// Returns the method name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Delivery => "delivery",
        }
    }

    /// Parses a method from its database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(DeliveryMethod::Pickup),
            "delivery" => Some(DeliveryMethod::Delivery),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fulfilment status of an order.
///
/// The nominal lifecycle:
/// ```text
/// Pending ──► Confirmed ──► Preparing ──► Ready ──► Completed
///    │            │             │           │
///    └────────────┴─────────────┴───────────┴──► Cancelled
/// ```
/// Whether transitions outside this graph are rejected is decided by
/// the domain layer's transition table, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An order: the immutable record of a completed checkout. Only
/// `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order reference, e.g. `MB2401170427`. Unique.
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub delivery_fee: Money,
    pub total_amount: Money,
    /// Contact details captured at order time, independent of the
    /// user's profile.
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One purchased line: a denormalized snapshot taken at order time so
/// historical orders stay accurate if the product is later renamed,
/// repriced, or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// Convenience link to the live product; cleared if the product is
    /// deleted. Never used for recomputation.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub product_price: Money,
    pub quantity: u32,
    /// product_price * quantity, computed at order time.
    pub total_price: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_status_roundtrip() {
        for status in [
            ProductStatus::Available,
            ProductStatus::OutOfStock,
            ProductStatus::Discontinued,
        ] {
            assert_eq!(ProductStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProductStatus::parse("unknown"), None);
    }

    #[test]
    fn order_status_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Preparing.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn cart_owner_accessors() {
        let user = common::UserId::new();
        let owner = CartOwner::User(user);
        assert_eq!(owner.user_id(), Some(user));
        assert!(owner.session_token().is_none());

        let owner = CartOwner::Session("sess-1".into());
        assert!(owner.user_id().is_none());
        assert_eq!(owner.session_token().map(|t| t.as_str()), Some("sess-1"));
    }

    #[test]
    fn cart_item_line_total() {
        let item = CartItem {
            id: common::CartItemId::new(),
            cart_id: common::CartId::new(),
            product_id: common::ProductId::new(),
            quantity: 3,
            unit_price: Money::from_cents(650),
            added_at: Utc::now(),
        };
        assert_eq!(item.line_total().cents(), 1950);
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");
        let json = serde_json::to_string(&ProductStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"out_of_stock\"");
        let json = serde_json::to_string(&DeliveryMethod::Pickup).unwrap();
        assert_eq!(json, "\"pickup\"");
    }
}
