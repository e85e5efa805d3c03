//! Catalog queries and admin product/category management.

use chrono::Utc;
use common::{CategoryId, Money, ProductId};
use store::{Category, Page, Paginated, Product, ProductFilter, ProductStatus, Store, StoreError};

use crate::error::{DomainError, Result, ValidationErrors};

/// Maximum length for product and category names.
const MAX_NAME_LEN: usize = 255;

/// Derives a URL-safe slug from a name: lowercase alphanumeric runs
/// joined by single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Admin input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub price: Money,
    pub stock_quantity: u32,
    pub category_id: CategoryId,
    pub is_active: bool,
    pub is_featured: bool,
    pub weight_grams: Option<f64>,
    pub status: ProductStatus,
}

impl ProductInput {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "Product name is required.");
        } else if self.name.len() > MAX_NAME_LEN {
            errors.push("name", format!("Name must be at most {MAX_NAME_LEN} characters."));
        }
        if self.price.cents() < 1 {
            errors.push("price", "Product price must be at least $0.01.");
        }
        if let Some(weight) = self.weight_grams
            && weight < 0.0
        {
            errors.push("weight_grams", "Weight cannot be negative.");
        }
        errors
    }
}

/// Admin input for creating a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub is_active: bool,
    pub sort_order: i32,
}

/// Read operations over the product catalog, plus the admin CRUD
/// surface.
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    /// Creates a new catalog service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists active products for the storefront, filtered and paginated.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(
        &self,
        search: Option<String>,
        category_id: Option<CategoryId>,
        page: Page,
    ) -> Result<Paginated<Product>> {
        let filter = ProductFilter {
            search,
            category_id,
            include_inactive: false,
        };
        Ok(self.store.list_products(&filter, page).await?)
    }

    /// Lists all products for the admin screens, inactive included.
    #[tracing::instrument(skip(self))]
    pub async fn list_all_products(
        &self,
        search: Option<String>,
        category_id: Option<CategoryId>,
        page: Page,
    ) -> Result<Paginated<Product>> {
        let filter = ProductFilter {
            search,
            category_id,
            include_inactive: true,
        };
        Ok(self.store.list_products(&filter, page).await?)
    }

    /// Lists active, available, featured products, bounded to `limit`.
    #[tracing::instrument(skip(self))]
    pub async fn featured_products(&self, limit: u32) -> Result<Vec<Product>> {
        Ok(self.store.list_featured_products(limit).await?)
    }

    /// Fetches an active product by slug.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Product> {
        let product = self
            .store
            .get_product_by_slug(slug)
            .await?
            .filter(|p| p.is_active)
            .ok_or(DomainError::NotFound("Product"))?;
        Ok(product)
    }

    /// Lists active categories ordered by sort_order.
    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.list_active_categories().await?)
    }

    /// Creates a product from admin input.
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: ProductInput) -> Result<Product> {
        self.validate_product_input(&input, None).await?;

        let product = Product {
            id: ProductId::new(),
            slug: slugify(&input.name),
            name: input.name,
            description: input.description,
            ingredients: input.ingredients,
            price: input.price,
            stock_quantity: input.stock_quantity,
            category_id: input.category_id,
            is_active: input.is_active,
            is_featured: input.is_featured,
            weight_grams: input.weight_grams,
            status: input.status,
            created_at: Utc::now(),
        };
        self.store
            .insert_product(&product)
            .await
            .map_err(map_duplicate_to_validation)?;
        Ok(product)
    }

    /// Updates a product in place from admin input. The slug is
    /// re-derived from the new name.
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<Product> {
        self.validate_product_input(&input, Some(id)).await?;

        let existing = self
            .store
            .get_product(id)
            .await?
            .ok_or(DomainError::NotFound("Product"))?;

        let product = Product {
            id,
            slug: slugify(&input.name),
            name: input.name,
            description: input.description,
            ingredients: input.ingredients,
            price: input.price,
            stock_quantity: input.stock_quantity,
            category_id: input.category_id,
            is_active: input.is_active,
            is_featured: input.is_featured,
            weight_grams: input.weight_grams,
            status: input.status,
            created_at: existing.created_at,
        };
        self.store
            .update_product(&product)
            .await
            .map_err(map_duplicate_to_validation)?;
        Ok(product)
    }

    /// Deletes a product. Historical order snapshots are unaffected.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        Ok(self.store.delete_product(id).await?)
    }

    /// Fetches a single product by id (admin detail screen).
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or(DomainError::NotFound("Product"))
    }

    /// Creates a category from admin input.
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        let mut errors = ValidationErrors::new();
        if input.name.trim().is_empty() {
            errors.push("name", "Category name is required.");
        } else if input.name.len() > MAX_NAME_LEN {
            errors.push("name", format!("Name must be at most {MAX_NAME_LEN} characters."));
        }
        errors.into_result()?;

        let category = Category {
            id: CategoryId::new(),
            slug: slugify(&input.name),
            name: input.name,
            is_active: input.is_active,
            sort_order: input.sort_order,
        };
        self.store
            .insert_category(&category)
            .await
            .map_err(map_duplicate_to_validation)?;
        Ok(category)
    }

    async fn validate_product_input(
        &self,
        input: &ProductInput,
        exclude: Option<ProductId>,
    ) -> Result<()> {
        let mut errors = input.validate();

        if errors.is_empty()
            && self
                .store
                .product_name_exists(&input.name, exclude)
                .await?
        {
            errors.push("name", "A product with this name already exists.");
        }
        if self.store.get_category(input.category_id).await?.is_none() {
            errors.push("category_id", "Selected category is invalid.");
        }
        errors.into_result()
    }
}

/// The store's uniqueness violations correspond to admin input errors,
/// so they surface as field-level validation failures.
fn map_duplicate_to_validation(err: StoreError) -> DomainError {
    match err {
        StoreError::DuplicateProductName(_) => {
            DomainError::invalid("name", "A product with this name already exists.")
        }
        StoreError::DuplicateProductSlug(_) => {
            DomainError::invalid("name", "A product with an equivalent name already exists.")
        }
        StoreError::DuplicateCategorySlug(_) => {
            DomainError::invalid("name", "A category with an equivalent name already exists.")
        }
        other => other.into(),
    }
}
