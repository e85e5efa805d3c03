//! Cart aggregate operations.
//!
//! Cart mutations never touch product stock; stock is only decremented
//! at order placement.

use chrono::Utc;
use common::{CartItemId, Money, ProductId};
use store::{Cart, CartItem, CartOwner, Product, Store};

use crate::error::{DomainError, Result};

/// Smallest quantity accepted for a cart line.
pub const MIN_ITEM_QUANTITY: u32 = 1;

/// Largest quantity accepted for a cart line.
pub const MAX_ITEM_QUANTITY: u32 = 10;

/// A cart together with its lines, in insertion order.
#[derive(Debug, Clone)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

impl CartView {
    /// Returns the sum of the line totals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|item| item.line_total()).sum()
    }
}

/// Cart line mutations with stock-bound validation.
pub struct CartService<S: Store> {
    store: S,
}

impl<S: Store> CartService<S> {
    /// Creates a new cart service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the owner's cart and its lines, creating an empty cart
    /// on first interaction.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, owner: &CartOwner) -> Result<CartView> {
        let cart = self.store.find_or_create_cart(owner).await?;
        let items = self.store.list_cart_items(cart.id).await?;
        Ok(CartView { cart, items })
    }

    /// Adds a product to the owner's cart.
    ///
    /// If a line for this product already exists the quantity is added
    /// to it rather than creating a second line. The combined quantity
    /// must not exceed the product's stock; on failure the line is
    /// left unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem> {
        validate_quantity(quantity)?;

        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(DomainError::NotFound("Product"))?;
        if !product.is_purchasable() {
            return Err(DomainError::Unavailable { name: product.name });
        }

        let cart = self.store.find_or_create_cart(owner).await?;

        let item = match self.store.find_cart_item(cart.id, product.id).await? {
            Some(mut existing) => {
                let combined = existing.quantity + quantity;
                check_stock(&product, combined)?;
                self.store
                    .set_cart_item_quantity(existing.id, combined)
                    .await?;
                existing.quantity = combined;
                existing
            }
            None => {
                check_stock(&product, quantity)?;
                let item = CartItem {
                    id: CartItemId::new(),
                    cart_id: cart.id,
                    product_id: product.id,
                    quantity,
                    unit_price: product.price,
                    added_at: Utc::now(),
                };
                self.store.insert_cart_item(&item).await?;
                item
            }
        };

        metrics::counter!("cart_items_added_total").increment(1);
        Ok(item)
    }

    /// Sets the quantity of a line in the owner's cart.
    #[tracing::instrument(skip(self))]
    pub async fn update_item(
        &self,
        owner: &CartOwner,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem> {
        validate_quantity(quantity)?;

        let mut item = self.owned_item(owner, item_id).await?;
        let product = self
            .store
            .get_product(item.product_id)
            .await?
            .ok_or(DomainError::NotFound("Product"))?;
        check_stock(&product, quantity)?;

        self.store.set_cart_item_quantity(item.id, quantity).await?;
        item.quantity = quantity;
        Ok(item)
    }

    /// Removes a line from the owner's cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, owner: &CartOwner, item_id: CartItemId) -> Result<()> {
        let item = self.owned_item(owner, item_id).await?;
        self.store.delete_cart_item(item.id).await?;
        Ok(())
    }

    /// Loads a cart line and verifies it belongs to the owner's cart.
    async fn owned_item(&self, owner: &CartOwner, item_id: CartItemId) -> Result<CartItem> {
        let item = self
            .store
            .get_cart_item(item_id)
            .await?
            .ok_or(DomainError::NotFound("Cart item"))?;
        let cart = self.store.find_or_create_cart(owner).await?;
        if item.cart_id != cart.id {
            return Err(DomainError::Forbidden("cart item"));
        }
        Ok(item)
    }
}

fn validate_quantity(quantity: u32) -> Result<()> {
    if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(DomainError::invalid(
            "quantity",
            format!("Quantity must be between {MIN_ITEM_QUANTITY} and {MAX_ITEM_QUANTITY}."),
        ));
    }
    Ok(())
}

fn check_stock(product: &Product, requested: u32) -> Result<()> {
    if requested > product.stock_quantity {
        return Err(DomainError::InsufficientStock {
            requested,
            available: product.stock_quantity,
        });
    }
    Ok(())
}
