//! The storage abstraction shared by the in-memory and Postgres
//! implementations.

use async_trait::async_trait;
use common::{CartId, CartItemId, CategoryId, OrderId, ProductId, UserId};

use crate::error::Result;
use crate::model::{Cart, CartItem, CartOwner, Category, Order, OrderItem, OrderStatus, Product};
use crate::query::{OrderFilter, Page, Paginated, ProductFilter, SalesSummary};

/// Products with stock below this count as "low stock" on the
/// dashboard.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Persistence operations for the storefront.
///
/// Implementations must make [`Store::place_order`] atomic: the order
/// row, its item snapshots, every guarded stock decrement, and the
/// cart clearing either all commit or none do.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Products --

    /// Inserts a new product. Fails with `DuplicateProductName` or
    /// `DuplicateProductSlug` on a uniqueness violation.
    async fn insert_product(&self, product: &Product) -> Result<()>;

    /// Replaces an existing product row. Fails with `NotFound` if the
    /// product does not exist.
    async fn update_product(&self, product: &Product) -> Result<()>;

    /// Deletes a product. Cart lines referencing it are removed;
    /// order item snapshots keep their data and drop the link.
    async fn delete_product(&self, id: ProductId) -> Result<()>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// Lists products newest first, filtered and paginated.
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paginated<Product>>;

    /// Lists active, available, featured products, bounded to `limit`.
    async fn list_featured_products(&self, limit: u32) -> Result<Vec<Product>>;

    /// Returns true if a product with this name exists, ignoring
    /// `exclude` (used when updating a product in place).
    async fn product_name_exists(&self, name: &str, exclude: Option<ProductId>) -> Result<bool>;

    // -- Categories --

    /// Inserts a new category. Fails with `DuplicateCategorySlug` on a
    /// uniqueness violation.
    async fn insert_category(&self, category: &Category) -> Result<()>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Lists active categories ordered by sort_order.
    async fn list_active_categories(&self) -> Result<Vec<Category>>;

    // -- Carts --

    /// Returns the single cart for this owner, creating an empty one
    /// if absent.
    async fn find_or_create_cart(&self, owner: &CartOwner) -> Result<Cart>;

    async fn get_cart_item(&self, id: CartItemId) -> Result<Option<CartItem>>;

    /// Finds the line for a product within a cart, if present.
    async fn find_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>>;

    /// Lists a cart's lines in insertion order.
    async fn list_cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>>;

    async fn insert_cart_item(&self, item: &CartItem) -> Result<()>;

    /// Sets the quantity of an existing line. Fails with `NotFound` if
    /// the line does not exist.
    async fn set_cart_item_quantity(&self, id: CartItemId, quantity: u32) -> Result<()>;

    async fn delete_cart_item(&self, id: CartItemId) -> Result<()>;

    // -- Orders --

    /// Atomically persists a checkout: inserts the order and its item
    /// snapshots, decrements each product's stock (failing the whole
    /// transaction with `InsufficientStock` if any decrement would go
    /// below zero), and deletes the cart's lines. Fails with
    /// `DuplicateOrderNumber` if the order number is taken; callers
    /// regenerate and retry.
    async fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        cart_id: CartId,
    ) -> Result<()>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Lists a user's orders newest first, paginated.
    async fn list_orders_for_user(&self, user_id: UserId, page: Page) -> Result<Paginated<Order>>;

    /// Lists all orders newest first, filtered and paginated.
    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<Paginated<Order>>;

    /// Sets an order's status. Fails with `NotFound` if the order does
    /// not exist.
    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()>;

    // -- Dashboard --

    /// Computes aggregate sales figures for the admin dashboard.
    async fn sales_summary(&self) -> Result<SalesSummary>;
}
