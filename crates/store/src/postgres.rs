use chrono::Utc;
use common::{CartId, CartItemId, CategoryId, Money, OrderId, OrderItemId, ProductId, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use async_trait::async_trait;

use crate::{
    Result, StoreError,
    model::{
        Cart, CartItem, CartOwner, Category, DeliveryMethod, Order, OrderItem, OrderStatus,
        Product, ProductStatus,
    },
    query::{OrderFilter, Page, Paginated, ProductFilter, SalesSummary},
    store::{LOW_STOCK_THRESHOLD, Store},
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let status: String = row.try_get("status")?;
        let status = ProductStatus::parse(&status)
            .ok_or_else(|| decode_error(format!("unknown product status: {status}")))?;
        let stock: i32 = row.try_get("stock_quantity")?;

        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            ingredients: row.try_get("ingredients")?,
            price: Money::from_cents(row.try_get("price")?),
            stock_quantity: u32::try_from(stock).unwrap_or(0),
            category_id: CategoryId::from_uuid(row.try_get::<Uuid, _>("category_id")?),
            is_active: row.try_get("is_active")?,
            is_featured: row.try_get("is_featured")?,
            weight_grams: row.try_get("weight_grams")?,
            status,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        Ok(Category {
            id: CategoryId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            is_active: row.try_get("is_active")?,
            sort_order: row.try_get("sort_order")?,
        })
    }

    fn row_to_cart(row: PgRow) -> Result<Cart> {
        let user_id: Option<Uuid> = row.try_get("user_id")?;
        let session_token: Option<String> = row.try_get("session_token")?;
        let owner = match (user_id, session_token) {
            (Some(id), None) => CartOwner::User(UserId::from_uuid(id)),
            (None, Some(token)) => CartOwner::Session(token.into()),
            _ => {
                return Err(decode_error(
                    "cart row must have exactly one of user_id and session_token",
                ));
            }
        };

        Ok(Cart {
            id: CartId::from_uuid(row.try_get::<Uuid, _>("id")?),
            owner,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_cart_item(row: PgRow) -> Result<CartItem> {
        let quantity: i32 = row.try_get("quantity")?;
        Ok(CartItem {
            id: CartItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            cart_id: CartId::from_uuid(row.try_get::<Uuid, _>("cart_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: u32::try_from(quantity).unwrap_or(0),
            unit_price: Money::from_cents(row.try_get("unit_price")?),
            added_at: row.try_get("added_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status)
            .ok_or_else(|| decode_error(format!("unknown order status: {status}")))?;
        let method: String = row.try_get("delivery_method")?;
        let delivery_method = DeliveryMethod::parse(&method)
            .ok_or_else(|| decode_error(format!("unknown delivery method: {method}")))?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_number: row.try_get("order_number")?,
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            status,
            subtotal: Money::from_cents(row.try_get("subtotal")?),
            tax_amount: Money::from_cents(row.try_get("tax_amount")?),
            delivery_fee: Money::from_cents(row.try_get("delivery_fee")?),
            total_amount: Money::from_cents(row.try_get("total_amount")?),
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
            customer_phone: row.try_get("customer_phone")?,
            delivery_method,
            delivery_address: row.try_get("delivery_address")?,
            pickup_time: row.try_get("pickup_time")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
        let quantity: i32 = row.try_get("quantity")?;
        Ok(OrderItem {
            id: OrderItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: row
                .try_get::<Option<Uuid>, _>("product_id")?
                .map(ProductId::from_uuid),
            product_name: row.try_get("product_name")?,
            product_price: Money::from_cents(row.try_get("product_price")?),
            quantity: u32::try_from(quantity).unwrap_or(0),
            total_price: Money::from_cents(row.try_get("total_price")?),
        })
    }

    async fn find_cart_by_owner(&self, owner: &CartOwner) -> Result<Option<Cart>> {
        let row = match owner {
            CartOwner::User(id) => {
                sqlx::query("SELECT id, user_id, session_token, created_at FROM carts WHERE user_id = $1")
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await?
            }
            CartOwner::Session(token) => {
                sqlx::query("SELECT id, user_id, session_token, created_at FROM carts WHERE session_token = $1")
                    .bind(token.as_str())
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        row.map(Self::row_to_cart).transpose()
    }
}

fn decode_error(message: impl Into<String>) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(message.into().into()))
}

/// Maps unique-constraint violations on the products table to their
/// dedicated error variants.
fn map_product_error(err: sqlx::Error, product: &Product) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.constraint() {
            Some("products_name_key") => {
                return StoreError::DuplicateProductName(product.name.clone());
            }
            Some("products_slug_key") => {
                return StoreError::DuplicateProductSlug(product.slug.clone());
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, description, ingredients, price, stock_quantity,
                                  category_id, is_active, is_featured, weight_grams, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(&product.ingredients)
        .bind(product.price.cents())
        .bind(product.stock_quantity as i32)
        .bind(product.category_id.as_uuid())
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.weight_grams)
        .bind(product.status.as_str())
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_product_error(e, product))?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, slug = $3, description = $4, ingredients = $5, price = $6,
                stock_quantity = $7, category_id = $8, is_active = $9, is_featured = $10,
                weight_grams = $11, status = $12
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(&product.ingredients)
        .bind(product.price.cents())
        .bind(product.stock_quantity as i32)
        .bind(product.category_id.as_uuid())
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.weight_grams)
        .bind(product.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_product_error(e, product))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", product.id));
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paginated<Product>> {
        // Build the WHERE clause dynamically, binding in declaration order.
        let mut conditions = String::new();
        let mut param_count = 0;

        if !filter.include_inactive {
            conditions.push_str(" AND is_active = TRUE");
        }
        if filter.search.is_some() {
            param_count += 1;
            conditions.push_str(&format!(" AND name ILIKE ${param_count}"));
        }
        if filter.category_id.is_some() {
            param_count += 1;
            conditions.push_str(&format!(" AND category_id = ${param_count}"));
        }

        let count_sql = format!("SELECT COUNT(*) FROM products WHERE 1=1{conditions}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref search) = filter.search {
            count_query = count_query.bind(format!("%{search}%"));
        }
        if let Some(category_id) = filter.category_id {
            count_query = count_query.bind(category_id.as_uuid());
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            "SELECT * FROM products WHERE 1=1{conditions} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            page.per_page(),
            page.offset()
        );
        let mut select_query = sqlx::query(&select_sql);
        if let Some(ref search) = filter.search {
            select_query = select_query.bind(format!("%{search}%"));
        }
        if let Some(category_id) = filter.category_id {
            select_query = select_query.bind(category_id.as_uuid());
        }
        let rows = select_query.fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_product)
            .collect::<Result<Vec<_>>>()?;
        Ok(Paginated::new(items, total as u64, page))
    }

    async fn list_featured_products(&self, limit: u32) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE is_active = TRUE AND status = 'available' AND is_featured = TRUE
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn product_name_exists(&self, name: &str, exclude: Option<ProductId>) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude.map(|id| id.as_uuid()))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            "INSERT INTO categories (id, name, slug, is_active, sort_order) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.is_active)
        .bind(category.sort_order)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("categories_slug_key")
            {
                return StoreError::DuplicateCategorySlug(category.slug.clone());
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT * FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_category).transpose()
    }

    async fn list_active_categories(&self) -> Result<Vec<Category>> {
        let rows =
            sqlx::query("SELECT * FROM categories WHERE is_active = TRUE ORDER BY sort_order")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn find_or_create_cart(&self, owner: &CartOwner) -> Result<Cart> {
        if let Some(cart) = self.find_cart_by_owner(owner).await? {
            return Ok(cart);
        }

        // Concurrent first interactions race on the owner's unique
        // index; DO NOTHING lets the loser fall through to the
        // winner's row on re-read.
        sqlx::query(
            "INSERT INTO carts (id, user_id, session_token, created_at) VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
        )
        .bind(CartId::new().as_uuid())
        .bind(owner.user_id().map(|id| id.as_uuid()))
        .bind(owner.session_token().map(|t| t.as_str().to_string()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.find_cart_by_owner(owner)
            .await?
            .ok_or_else(|| StoreError::not_found("Cart", owner.clone()))
    }

    async fn get_cart_item(&self, id: CartItemId) -> Result<Option<CartItem>> {
        let row = sqlx::query("SELECT * FROM cart_items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_cart_item).transpose()
    }

    async fn find_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>> {
        let row = sqlx::query("SELECT * FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id.as_uuid())
            .bind(product_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_cart_item).transpose()
    }

    async fn list_cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query("SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY added_at")
            .bind(cart_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_cart_item).collect()
    }

    async fn insert_cart_item(&self, item: &CartItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, quantity, unit_price, added_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.cart_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.quantity as i32)
        .bind(item.unit_price.cents())
        .bind(item.added_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_cart_item_quantity(&self, id: CartItemId, quantity: u32) -> Result<()> {
        let result = sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(quantity as i32)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Cart item", id));
        }
        Ok(())
    }

    async fn delete_cart_item(&self, id: CartItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
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
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, user_id, status, subtotal, tax_amount,
                                delivery_fee, total_amount, customer_name, customer_email,
                                customer_phone, delivery_method, delivery_address, pickup_time,
                                notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.user_id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.subtotal.cents())
        .bind(order.tax_amount.cents())
        .bind(order.delivery_fee.cents())
        .bind(order.total_amount.cents())
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(order.delivery_method.as_str())
        .bind(&order.delivery_address)
        .bind(order.pickup_time)
        .bind(&order.notes)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_order_number_key")
            {
                return StoreError::DuplicateOrderNumber(order.order_number.clone());
            }
            StoreError::Database(e)
        })?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, product_name, product_price,
                                         quantity, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.map(|id| id.as_uuid()))
            .bind(&item.product_name)
            .bind(item.product_price.cents())
            .bind(item.quantity as i32)
            .bind(item.total_price.cents())
            .execute(&mut *tx)
            .await?;

            let product_id = match item.product_id {
                Some(id) => id,
                None => continue,
            };

            // Guarded decrement: refuses to go below zero. A miss here
            // aborts the whole transaction.
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - $2
                WHERE id = $1 AND stock_quantity >= $2
                "#,
            )
            .bind(product_id.as_uuid())
            .bind(item.quantity as i32)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: Option<i32> =
                    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                        .bind(product_id.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await?;
                return match available {
                    Some(stock) => Err(StoreError::InsufficientStock {
                        product_id,
                        requested: item.quantity,
                        available: u32::try_from(stock).unwrap_or(0),
                    }),
                    None => Err(StoreError::not_found("Product", product_id)),
                };
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_order).transpose()
    }

    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query("SELECT * FROM order_items WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_order_item).collect()
    }

    async fn list_orders_for_user(&self, user_id: UserId, page: Page) -> Result<Paginated<Order>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT {} OFFSET {}",
            page.per_page(),
            page.offset()
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        Ok(Paginated::new(items, total as u64, page))
    }

    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<Paginated<Order>> {
        let mut conditions = String::new();
        let mut param_count = 0;

        if filter.search.is_some() {
            param_count += 1;
            conditions.push_str(&format!(
                " AND (order_number ILIKE ${n} OR customer_name ILIKE ${n} OR customer_email ILIKE ${n})",
                n = param_count
            ));
        }
        if filter.status.is_some() {
            param_count += 1;
            conditions.push_str(&format!(" AND status = ${param_count}"));
        }

        let count_sql = format!("SELECT COUNT(*) FROM orders WHERE 1=1{conditions}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref search) = filter.search {
            count_query = count_query.bind(format!("%{search}%"));
        }
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.as_str());
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            "SELECT * FROM orders WHERE 1=1{conditions} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            page.per_page(),
            page.offset()
        );
        let mut select_query = sqlx::query(&select_sql);
        if let Some(ref search) = filter.search {
            select_query = select_query.bind(format!("%{search}%"));
        }
        if let Some(status) = filter.status {
            select_query = select_query.bind(status.as_str());
        }
        let rows = select_query.fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        Ok(Paginated::new(items, total as u64, page))
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Order", id));
        }
        Ok(())
    }

    async fn sales_summary(&self) -> Result<SalesSummary> {
        let total_revenue: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE status <> 'cancelled'",
        )
        .fetch_one(&self.pool)
        .await?;

        let today_revenue: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount), 0) FROM orders
            WHERE status <> 'cancelled' AND created_at >= date_trunc('day', now())
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        let pending_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        let active_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = TRUE")
                .fetch_one(&self.pool)
                .await?;

        let low_stock_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock_quantity < $1")
                .bind(LOW_STOCK_THRESHOLD as i32)
                .fetch_one(&self.pool)
                .await?;

        Ok(SalesSummary {
            total_revenue: Money::from_cents(total_revenue),
            today_revenue: Money::from_cents(today_revenue),
            total_orders: total_orders as u64,
            pending_orders: pending_orders as u64,
            active_products: active_products as u64,
            low_stock_products: low_stock_products as u64,
        })
    }
}
