//! Public catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use common::CategoryId;
use serde::{Deserialize, Serialize};
use store::{Category, Page, Paginated, Product, ProductStatus, Store};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// How many featured products the storefront shows.
const FEATURED_LIMIT: u32 = 6;

const DEFAULT_PAGE_SIZE: u32 = 12;

// -- Request types --

#[derive(Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListParams {
    pub fn page(&self, default_per_page: u32) -> Page {
        Page::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(default_per_page),
        )
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: u32,
    pub category_id: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub weight_grams: Option<f64>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            slug: product.slug,
            description: product.description,
            ingredients: product.ingredients,
            price_cents: product.price.cents(),
            stock_quantity: product.stock_quantity,
            category_id: product.category_id.to_string(),
            is_active: product.is_active,
            is_featured: product.is_featured,
            weight_grams: product.weight_grams,
            status: product.status,
            created_at: product.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub sort_order: i32,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            slug: category.slug,
            is_active: category.is_active,
            sort_order: category.sort_order,
        }
    }
}

#[derive(Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl<T, U: From<T>> From<Paginated<T>> for PaginatedResponse<U> {
    fn from(page: Paginated<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items.into_iter().map(U::from).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        }
    }
}

// -- Handlers --

/// GET /products — list active products, filtered and paginated.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<ProductResponse>>, ApiError> {
    let page = params.page(DEFAULT_PAGE_SIZE);
    let products = state
        .catalog
        .list_products(
            params.search,
            params.category_id.map(CategoryId::from_uuid),
            page,
        )
        .await?;
    Ok(Json(products.into()))
}

/// GET /products/featured — bounded list of featured products.
#[tracing::instrument(skip(state))]
pub async fn featured<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.featured_products(FEATURED_LIMIT).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/{slug} — fetch an active product by slug.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(slug): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_by_slug(&slug).await?;
    Ok(Json(product.into()))
}

/// GET /categories — active categories in display order.
#[tracing::instrument(skip(state))]
pub async fn categories<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}
