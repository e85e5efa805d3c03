//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{CartItemId, CategoryId, Money, OrderId, OrderItemId, ProductId, UserId};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    Cart, CartItem, CartOwner, Category, DeliveryMethod, Order, OrderItem, OrderStatus,
    PostgresStore, Product, ProductStatus, Store, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!(
                "../../../migrations/0001_create_storefront_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE order_items, orders, cart_items, carts, products, categories")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn seed_category(store: &PostgresStore) -> Category {
    let category = Category {
        id: CategoryId::new(),
        name: "Breads".to_string(),
        slug: "breads".to_string(),
        is_active: true,
        sort_order: 1,
    };
    store.insert_category(&category).await.unwrap();
    category
}

async fn seed_product(store: &PostgresStore, category_id: CategoryId, stock: u32) -> Product {
    let id = ProductId::new();
    let product = Product {
        id,
        name: format!("Sourdough {id}"),
        slug: format!("sourdough-{id}"),
        description: Some("Naturally leavened".to_string()),
        ingredients: None,
        price: Money::from_cents(650),
        stock_quantity: stock,
        category_id,
        is_active: true,
        is_featured: false,
        weight_grams: Some(800.0),
        status: ProductStatus::Available,
        created_at: Utc::now(),
    };
    store.insert_product(&product).await.unwrap();
    product
}

fn build_order(user_id: UserId, number: &str) -> Order {
    Order {
        id: OrderId::new(),
        order_number: number.to_string(),
        user_id,
        status: OrderStatus::Pending,
        subtotal: Money::from_cents(1300),
        tax_amount: Money::from_cents(104),
        delivery_fee: Money::zero(),
        total_amount: Money::from_cents(1404),
        customer_name: "Jane Doe".to_string(),
        customer_email: "jane@example.com".to_string(),
        customer_phone: "555-0100".to_string(),
        delivery_method: DeliveryMethod::Pickup,
        delivery_address: None,
        pickup_time: Utc::now() + Duration::hours(2),
        notes: None,
        created_at: Utc::now(),
    }
}

fn build_snapshot(order: &Order, product: &Product, quantity: u32) -> OrderItem {
    OrderItem {
        id: OrderItemId::new(),
        order_id: order.id,
        product_id: Some(product.id),
        product_name: product.name.clone(),
        product_price: product.price,
        quantity,
        total_price: product.price.multiply(quantity),
    }
}

async fn cart_with_line(
    store: &PostgresStore,
    owner: &CartOwner,
    product: &Product,
    quantity: u32,
) -> (Cart, CartItem) {
    let cart = store.find_or_create_cart(owner).await.unwrap();
    let line = CartItem {
        id: CartItemId::new(),
        cart_id: cart.id,
        product_id: product.id,
        quantity,
        unit_price: product.price,
        added_at: Utc::now(),
    };
    store.insert_cart_item(&line).await.unwrap();
    (cart, line)
}

#[tokio::test]
#[serial]
async fn product_roundtrip() {
    let store = get_test_store().await;
    let category = seed_category(&store).await;
    let product = seed_product(&store, category.id, 10).await;

    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, product.id);
    assert_eq!(fetched.name, product.name);
    assert_eq!(fetched.slug, product.slug);
    assert_eq!(fetched.description, product.description);
    assert_eq!(fetched.price, product.price);
    assert_eq!(fetched.stock_quantity, 10);
    assert_eq!(fetched.category_id, product.category_id);
    assert_eq!(fetched.status, ProductStatus::Available);
    assert_eq!(fetched.weight_grams, Some(800.0));

    let by_slug = store
        .get_product_by_slug(&product.slug)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_slug.id, product.id);
}

#[tokio::test]
#[serial]
async fn duplicate_product_name_maps_to_dedicated_error() {
    let store = get_test_store().await;
    let category = seed_category(&store).await;
    let product = seed_product(&store, category.id, 10).await;

    let mut dup = product.clone();
    dup.id = ProductId::new();
    dup.slug = format!("other-{}", dup.id);
    let err = store.insert_product(&dup).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateProductName(_)));
}

#[tokio::test]
#[serial]
async fn find_or_create_cart_reuses_owner_row() {
    let store = get_test_store().await;

    let owner = CartOwner::Session("sess-abc".into());
    let first = store.find_or_create_cart(&owner).await.unwrap();
    let second = store.find_or_create_cart(&owner).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.owner, owner);

    let user_owner = CartOwner::User(UserId::new());
    let user_cart = store.find_or_create_cart(&user_owner).await.unwrap();
    assert_ne!(user_cart.id, first.id);
}

#[tokio::test]
#[serial]
async fn place_order_commits_all_effects() {
    let store = get_test_store().await;
    let category = seed_category(&store).await;
    let product = seed_product(&store, category.id, 10).await;

    let user_id = UserId::new();
    let owner = CartOwner::User(user_id);
    let (cart, _line) = cart_with_line(&store, &owner, &product, 2).await;

    let order = build_order(user_id, "MB2401170427");
    let items = vec![build_snapshot(&order, &product, 2)];
    store.place_order(&order, &items, cart.id).await.unwrap();

    let stored = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 8);
    assert!(store.list_cart_items(cart.id).await.unwrap().is_empty());

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.order_number, "MB2401170427");
    assert_eq!(fetched.status, OrderStatus::Pending);

    let snapshots = store.list_order_items(order.id).await.unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].total_price.cents(), 1300);
}

#[tokio::test]
#[serial]
async fn place_order_rolls_back_when_any_decrement_fails() {
    let store = get_test_store().await;
    let category = seed_category(&store).await;
    let plenty = seed_product(&store, category.id, 10).await;
    let scarce = seed_product(&store, category.id, 1).await;

    let user_id = UserId::new();
    let owner = CartOwner::User(user_id);
    let cart = store.find_or_create_cart(&owner).await.unwrap();
    for (product, quantity) in [(&plenty, 2u32), (&scarce, 3u32)] {
        store
            .insert_cart_item(&CartItem {
                id: CartItemId::new(),
                cart_id: cart.id,
                product_id: product.id,
                quantity,
                unit_price: product.price,
                added_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    let order = build_order(user_id, "MB2401170500");
    let items = vec![
        build_snapshot(&order, &plenty, 2),
        build_snapshot(&order, &scarce, 3),
    ];
    let err = store.place_order(&order, &items, cart.id).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::InsufficientStock {
            requested: 3,
            available: 1,
            ..
        }
    ));

    // The transaction rolled back: no order, stock untouched, cart intact.
    assert!(store.get_order(order.id).await.unwrap().is_none());
    let stored = store.get_product(plenty.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 10);
    assert_eq!(store.list_cart_items(cart.id).await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn duplicate_order_number_maps_to_dedicated_error() {
    let store = get_test_store().await;
    let category = seed_category(&store).await;
    let product = seed_product(&store, category.id, 10).await;

    let user_id = UserId::new();
    let owner = CartOwner::User(user_id);
    let (cart, _) = cart_with_line(&store, &owner, &product, 1).await;

    let order = build_order(user_id, "MB2401170001");
    store
        .place_order(&order, &[build_snapshot(&order, &product, 1)], cart.id)
        .await
        .unwrap();

    let second = build_order(user_id, "MB2401170001");
    let err = store
        .place_order(&second, &[build_snapshot(&second, &product, 1)], cart.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateOrderNumber(_)));
}

#[tokio::test]
#[serial]
async fn deleting_a_product_keeps_order_snapshots() {
    let store = get_test_store().await;
    let category = seed_category(&store).await;
    let product = seed_product(&store, category.id, 10).await;

    let user_id = UserId::new();
    let owner = CartOwner::User(user_id);
    let (cart, _) = cart_with_line(&store, &owner, &product, 1).await;

    let order = build_order(user_id, "MB2401170600");
    store
        .place_order(&order, &[build_snapshot(&order, &product, 1)], cart.id)
        .await
        .unwrap();

    store.delete_product(product.id).await.unwrap();

    let snapshots = store.list_order_items(order.id).await.unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].product_id, None);
    assert_eq!(snapshots[0].product_name, product.name);
    assert_eq!(snapshots[0].product_price.cents(), 650);
}

#[tokio::test]
#[serial]
async fn order_listings_filter_and_paginate() {
    let store = get_test_store().await;
    let category = seed_category(&store).await;
    let product = seed_product(&store, category.id, 100).await;

    let user_id = UserId::new();
    let owner = CartOwner::User(user_id);
    let cart = store.find_or_create_cart(&owner).await.unwrap();

    for i in 0..3 {
        let mut order = build_order(user_id, &format!("MB240117000{i}"));
        order.customer_name = format!("Customer {i}");
        store
            .place_order(&order, &[build_snapshot(&order, &product, 1)], cart.id)
            .await
            .unwrap();
    }

    let page = store
        .list_orders_for_user(user_id, store::Page::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages(), 2);

    let filter = store::OrderFilter {
        search: Some("customer 1".to_string()),
        status: None,
    };
    let found = store
        .list_orders(&filter, store::Page::default())
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].customer_name, "Customer 1");

    let filter = store::OrderFilter {
        search: None,
        status: Some(OrderStatus::Cancelled),
    };
    let none = store
        .list_orders(&filter, store::Page::default())
        .await
        .unwrap();
    assert_eq!(none.total, 0);
}
