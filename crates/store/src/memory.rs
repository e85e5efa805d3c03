use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartId, CartItemId, CategoryId, Money, OrderId, ProductId, UserId};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    model::{Cart, CartItem, CartOwner, Category, Order, OrderItem, OrderStatus, Product},
    query::{OrderFilter, Page, Paginated, ProductFilter, SalesSummary},
    store::{LOW_STOCK_THRESHOLD, Store},
};

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    categories: Vec<Category>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
}

/// In-memory store implementation for tests and development.
///
/// Stores all rows in memory behind a single lock and provides the
/// same interface and transactional semantics as the PostgreSQL
/// implementation: `place_order` validates every stock decrement
/// before mutating anything.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Clears all rows.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        *inner = Inner::default();
    }
}

fn paginate<T: Clone>(rows: Vec<T>, page: Page) -> Paginated<T> {
    let total = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.per_page() as usize)
        .collect();
    Paginated::new(items, total, page)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.products.iter().any(|p| p.name == product.name) {
            return Err(StoreError::DuplicateProductName(product.name.clone()));
        }
        if inner.products.iter().any(|p| p.slug == product.slug) {
            return Err(StoreError::DuplicateProductSlug(product.slug.clone()));
        }
        inner.products.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner
            .products
            .iter()
            .any(|p| p.id != product.id && p.slug == product.slug)
        {
            return Err(StoreError::DuplicateProductSlug(product.slug.clone()));
        }
        let existing = inner
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| StoreError::not_found("Product", product.id))?;
        *existing = product.clone();
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        if inner.products.len() == before {
            return Err(StoreError::not_found("Product", id));
        }
        inner.cart_items.retain(|item| item.product_id != id);
        for item in &mut inner.order_items {
            if item.product_id == Some(id) {
                item.product_id = None;
            }
        }
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paginated<Product>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Product> = inner
            .products
            .iter()
            .filter(|p| filter.include_inactive || p.is_active)
            .filter(|p| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|s| contains_ci(&p.name, s))
            })
            .filter(|p| filter.category_id.is_none_or(|c| p.category_id == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, page))
    }

    async fn list_featured_products(&self, limit: u32) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .filter(|p| p.is_purchasable() && p.is_featured)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn product_name_exists(&self, name: &str, exclude: Option<ProductId>) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .any(|p| p.name == name && Some(p.id) != exclude))
    }

    async fn insert_category(&self, category: &Category) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.categories.iter().any(|c| c.slug == category.slug) {
            return Err(StoreError::DuplicateCategorySlug(category.slug.clone()));
        }
        inner.categories.push(category.clone());
        Ok(())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let inner = self.inner.read().await;
        Ok(inner.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_active_categories(&self) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Category> = inner
            .categories
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.sort_order);
        Ok(rows)
    }

    async fn find_or_create_cart(&self, owner: &CartOwner) -> Result<Cart> {
        let mut inner = self.inner.write().await;
        if let Some(cart) = inner.carts.iter().find(|c| &c.owner == owner) {
            return Ok(cart.clone());
        }
        let cart = Cart {
            id: CartId::new(),
            owner: owner.clone(),
            created_at: Utc::now(),
        };
        inner.carts.push(cart.clone());
        Ok(cart)
    }

    async fn get_cart_item(&self, id: CartItemId) -> Result<Option<CartItem>> {
        let inner = self.inner.read().await;
        Ok(inner.cart_items.iter().find(|i| i.id == id).cloned())
    }

    async fn find_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .cart_items
            .iter()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
            .cloned())
    }

    async fn list_cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<CartItem> = inner
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.added_at);
        Ok(rows)
    }

    async fn insert_cart_item(&self, item: &CartItem) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.cart_items.push(item.clone());
        Ok(())
    }

    async fn set_cart_item_quantity(&self, id: CartItemId, quantity: u32) -> Result<()> {
        let mut inner = self.inner.write().await;
        let item = inner
            .cart_items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::not_found("Cart item", id))?;
        item.quantity = quantity;
        Ok(())
    }

    async fn delete_cart_item(&self, id: CartItemId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.cart_items.len();
        inner.cart_items.retain(|i| i.id != id);
        if inner.cart_items.len() == before {
            return Err(StoreError::not_found("Cart item", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, order, items), fields(order_number = %order.order_number))]
    async fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        cart_id: CartId,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(StoreError::DuplicateOrderNumber(order.order_number.clone()));
        }

        // Validate every decrement before mutating anything so a
        // failure leaves no partial state behind.
        for item in items {
            let product_id = match item.product_id {
                Some(id) => id,
                None => continue,
            };
            let product = inner
                .products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| StoreError::not_found("Product", product_id))?;
            if product.stock_quantity < item.quantity {
                return Err(StoreError::InsufficientStock {
                    product_id,
                    requested: item.quantity,
                    available: product.stock_quantity,
                });
            }
        }

        for item in items {
            if let Some(product_id) = item.product_id
                && let Some(product) = inner.products.iter_mut().find(|p| p.id == product_id)
            {
                product.stock_quantity -= item.quantity;
            }
        }
        inner.orders.push(order.clone());
        inner.order_items.extend(items.iter().cloned());
        inner.cart_items.retain(|i| i.cart_id != cart_id);
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_orders_for_user(&self, user_id: UserId, page: Page) -> Result<Paginated<Order>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Order> = inner
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, page))
    }

    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<Paginated<Order>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Order> = inner
            .orders
            .iter()
            .filter(|o| {
                filter.search.as_deref().is_none_or(|s| {
                    contains_ci(&o.order_number, s)
                        || contains_ci(&o.customer_name, s)
                        || contains_ci(&o.customer_email, s)
                })
            })
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, page))
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::not_found("Order", id))?;
        order.status = status;
        Ok(())
    }

    async fn sales_summary(&self) -> Result<SalesSummary> {
        let inner = self.inner.read().await;
        let today = Utc::now().date_naive();

        let not_cancelled = inner
            .orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled);
        let total_revenue: Money = not_cancelled.clone().map(|o| o.total_amount).sum();
        let today_revenue: Money = not_cancelled
            .filter(|o| o.created_at.date_naive() == today)
            .map(|o| o.total_amount)
            .sum();

        Ok(SalesSummary {
            total_revenue,
            today_revenue,
            total_orders: inner.orders.len() as u64,
            pending_orders: inner
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count() as u64,
            active_products: inner.products.iter().filter(|p| p.is_active).count() as u64,
            low_stock_products: inner
                .products
                .iter()
                .filter(|p| p.stock_quantity < LOW_STOCK_THRESHOLD)
                .count() as u64,
        })
    }
}
