//! The order placement workflow.
//!
//! Converts a cart into an immutable order: validates the request,
//! computes totals from the frozen line prices, generates an order
//! number, and hands the whole mutation to the store's transactional
//! `place_order`. Any failure before that call leaves no state behind;
//! any failure inside it rolls the transaction back.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderItemId, UserId};
use store::{
    CartItem, CartOwner, DeliveryMethod, Order, OrderItem, OrderStatus, Product, Store, StoreError,
};
use uuid::Uuid;

use crate::error::{DomainError, Result, ValidationErrors};

/// Sales tax applied to the subtotal, in whole percent.
pub const TAX_RATE_PERCENT: u32 = 8;

/// Flat fee charged for delivery orders.
pub const DELIVERY_FEE: Money = Money::from_cents(500);

/// How many order numbers to try before giving up on collisions.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

const MAX_NAME_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 255;
const MAX_PHONE_LEN: usize = 20;
const MAX_NOTES_LEN: usize = 500;

/// Customer-supplied checkout details.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Validates the request field by field against the checkout input
    /// contract.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.customer_name.trim().is_empty() {
            errors.push("customer_name", "Please provide your full name.");
        } else if self.customer_name.len() > MAX_NAME_LEN {
            errors.push(
                "customer_name",
                format!("Name must be at most {MAX_NAME_LEN} characters."),
            );
        }

        if self.customer_email.trim().is_empty() {
            errors.push("customer_email", "Email address is required.");
        } else if self.customer_email.len() > MAX_EMAIL_LEN
            || !is_valid_email(&self.customer_email)
        {
            errors.push("customer_email", "Please provide a valid email address.");
        }

        if self.customer_phone.trim().is_empty() {
            errors.push(
                "customer_phone",
                "Phone number is required for order confirmation.",
            );
        } else if self.customer_phone.len() > MAX_PHONE_LEN {
            errors.push(
                "customer_phone",
                format!("Phone number must be at most {MAX_PHONE_LEN} characters."),
            );
        }

        if self.delivery_method == DeliveryMethod::Delivery
            && self
                .delivery_address
                .as_deref()
                .is_none_or(|a| a.trim().is_empty())
        {
            errors.push(
                "delivery_address",
                "Delivery address is required for delivery orders.",
            );
        }

        if self.pickup_time <= now {
            errors.push(
                "pickup_time",
                "Pickup/delivery time must be in the future.",
            );
        }

        if let Some(ref notes) = self.notes
            && notes.len() > MAX_NOTES_LEN
        {
            errors.push(
                "notes",
                format!("Notes must be at most {MAX_NOTES_LEN} characters."),
            );
        }

        errors.into_result()
    }
}

/// Minimal shape check: one `@` with a dotted domain, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Generates an order number: `MB` + `yymmdd` + a 4-digit value in
/// [1, 9999]. The randomness comes from a v4 UUID; uniqueness is
/// enforced by the store, with callers regenerating on collision.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let bytes = *Uuid::new_v4().as_bytes();
    let n = u16::from_be_bytes([bytes[0], bytes[1]]) % 9999 + 1;
    format!("MB{}{:04}", now.format("%y%m%d"), n)
}

/// The order placement workflow.
pub struct CheckoutService<S: Store> {
    store: S,
}

impl<S: Store> CheckoutService<S> {
    /// Creates a new checkout service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order from the user's cart.
    ///
    /// Returns the created order (status pending) and its line
    /// snapshots. The cart is emptied on success. On any failure no
    /// order exists, no stock has moved, and the cart is untouched.
    #[tracing::instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> Result<(Order, Vec<OrderItem>)> {
        let owner = CartOwner::User(user_id);
        let cart = self.store.find_or_create_cart(&owner).await?;
        let lines = self.store.list_cart_items(cart.id).await?;
        if lines.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let now = Utc::now();
        request.validate(now)?;

        // Reload each line's product so totals and snapshots reflect
        // the current catalog rather than a stale page.
        let mut products = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self
                .store
                .get_product(line.product_id)
                .await?
                .ok_or(DomainError::NotFound("Product"))?;
            if line.quantity > product.stock_quantity {
                return Err(DomainError::InsufficientStock {
                    requested: line.quantity,
                    available: product.stock_quantity,
                });
            }
            products.push(product);
        }

        // Subtotal uses the unit price frozen on each cart line, not
        // the live product price.
        let subtotal: Money = lines.iter().map(CartItem::line_total).sum();
        let tax_amount = subtotal.percent(TAX_RATE_PERCENT);
        let delivery_fee = match request.delivery_method {
            DeliveryMethod::Delivery => DELIVERY_FEE,
            DeliveryMethod::Pickup => Money::zero(),
        };
        let total_amount = subtotal + tax_amount + delivery_fee;

        let order_id = OrderId::new();
        let items: Vec<OrderItem> = lines
            .iter()
            .zip(&products)
            .map(|(line, product)| snapshot_line(order_id, line, product))
            .collect();

        let mut attempts = 0;
        let order = loop {
            let order = Order {
                id: order_id,
                order_number: generate_order_number(now),
                user_id,
                status: OrderStatus::Pending,
                subtotal,
                tax_amount,
                delivery_fee,
                total_amount,
                customer_name: request.customer_name.clone(),
                customer_email: request.customer_email.clone(),
                customer_phone: request.customer_phone.clone(),
                delivery_method: request.delivery_method,
                delivery_address: request.delivery_address.clone(),
                pickup_time: request.pickup_time,
                notes: request.notes.clone(),
                created_at: now,
            };

            match self.store.place_order(&order, &items, cart.id).await {
                Ok(()) => break order,
                Err(StoreError::DuplicateOrderNumber(number)) => {
                    attempts += 1;
                    tracing::warn!(%number, attempts, "order number collision, regenerating");
                    if attempts >= ORDER_NUMBER_ATTEMPTS {
                        metrics::counter!("checkout_failures_total").increment(1);
                        return Err(StoreError::DuplicateOrderNumber(number).into());
                    }
                }
                Err(err) => {
                    metrics::counter!("checkout_failures_total").increment(1);
                    return Err(err.into());
                }
            }
        };

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(
            order_number = %order.order_number,
            total_cents = order.total_amount.cents(),
            "order placed"
        );
        Ok((order, items))
    }
}

/// Builds the denormalized snapshot for one purchased line. The name
/// comes from the live product; the price stays the one frozen on the
/// cart line so the totals remain internally consistent.
fn snapshot_line(order_id: OrderId, line: &CartItem, product: &Product) -> OrderItem {
    OrderItem {
        id: OrderItemId::new(),
        order_id,
        product_id: Some(product.id),
        product_name: product.name.clone(),
        product_price: line.unit_price,
        quantity: line.quantity,
        total_price: line.line_total(),
    }
}
