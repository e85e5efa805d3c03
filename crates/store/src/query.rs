//! Query, filter, and pagination types.

use common::{CategoryId, Money};
use serde::{Deserialize, Serialize};

use crate::model::OrderStatus;

/// A page request: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    per_page: u32,
}

impl Page {
    /// Creates a page request. The page number is clamped to at least 1
    /// and the page size to 1..=100.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Returns the 1-based page number.
    pub fn number(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Returns the number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Wraps a page of items with its pagination metadata.
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.number(),
            per_page: page.per_page(),
        }
    }

    /// Returns the number of pages needed to cover `total` rows.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page as u64)
    }
}

/// Filter for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    /// When false (the storefront default), only active products are
    /// returned. Admin listings set this to true.
    pub include_inactive: bool,
}

/// Filter for the admin order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Case-insensitive substring match on order number, customer name,
    /// or customer email.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Aggregate sales figures for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Revenue across all non-cancelled orders.
    pub total_revenue: Money,
    /// Revenue across non-cancelled orders created today (UTC).
    pub today_revenue: Money,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub active_products: u64,
    /// Products with stock below [`crate::LOW_STOCK_THRESHOLD`].
    pub low_stock_products: u64,
}
