//! The order query surface and status management.

use std::collections::HashSet;

use common::{OrderId, UserId};
use store::{Order, OrderFilter, OrderItem, OrderStatus, Page, Paginated, SalesSummary, Store};

use crate::error::{DomainError, Result};

/// The set of permitted status transitions.
///
/// The reference behavior accepts any status value, which back-office
/// staff rely on for corrections; [`StatusTransitions::strict`] is
/// available for operators who want the nominal lifecycle enforced.
#[derive(Debug, Clone, Default)]
pub struct StatusTransitions {
    /// `None` permits every transition.
    allowed: Option<HashSet<(OrderStatus, OrderStatus)>>,
}

impl StatusTransitions {
    /// Permits any status change (the default).
    pub fn lenient() -> Self {
        Self { allowed: None }
    }

    /// Permits only the nominal lifecycle:
    /// pending → confirmed → preparing → ready → completed, plus
    /// cancellation from any non-terminal state.
    pub fn strict() -> Self {
        let mut allowed = HashSet::from([
            (OrderStatus::Pending, OrderStatus::Confirmed),
            (OrderStatus::Confirmed, OrderStatus::Preparing),
            (OrderStatus::Preparing, OrderStatus::Ready),
            (OrderStatus::Ready, OrderStatus::Completed),
        ]);
        for status in OrderStatus::ALL {
            if !status.is_terminal() {
                allowed.insert((status, OrderStatus::Cancelled));
            }
        }
        Self {
            allowed: Some(allowed),
        }
    }

    /// Permits exactly the given transitions.
    pub fn custom(pairs: impl IntoIterator<Item = (OrderStatus, OrderStatus)>) -> Self {
        Self {
            allowed: Some(pairs.into_iter().collect()),
        }
    }

    /// Returns true if moving from `from` to `to` is permitted.
    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|set| set.contains(&(from, to)))
    }
}

/// An order together with its line snapshots.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order listings, retrieval, and status updates.
pub struct OrderService<S: Store> {
    store: S,
    transitions: StatusTransitions,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service with the default (lenient)
    /// transition table.
    pub fn new(store: S) -> Self {
        Self::with_transitions(store, StatusTransitions::default())
    }

    /// Creates a new order service with the given transition table.
    pub fn with_transitions(store: S, transitions: StatusTransitions) -> Self {
        Self { store, transitions }
    }

    /// Lists the user's own orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId, page: Page) -> Result<Paginated<Order>> {
        Ok(self.store.list_orders_for_user(user_id, page).await?)
    }

    /// Fetches one of the user's own orders with its items.
    ///
    /// Requesting another user's order fails with `Forbidden`.
    #[tracing::instrument(skip(self))]
    pub async fn get_for_user(&self, order_id: OrderId, user_id: UserId) -> Result<OrderView> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order"))?;
        if order.user_id != user_id {
            return Err(DomainError::Forbidden("order"));
        }
        let items = self.store.list_order_items(order_id).await?;
        Ok(OrderView { order, items })
    }

    /// Lists all orders for the back office, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self, filter: &OrderFilter, page: Page) -> Result<Paginated<Order>> {
        Ok(self.store.list_orders(filter, page).await?)
    }

    /// Fetches any order with its items (back office).
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, order_id: OrderId) -> Result<OrderView> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order"))?;
        let items = self.store.list_order_items(order_id).await?;
        Ok(OrderView { order, items })
    }

    /// Sets an order's status, subject to the configured transition
    /// table.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order"))?;

        if !self.transitions.allows(order.status, status) {
            return Err(DomainError::InvalidStatusTransition {
                from: order.status,
                to: status,
            });
        }

        self.store.update_order_status(order_id, status).await?;
        metrics::counter!("order_status_updates_total").increment(1);
        order.status = status;
        Ok(order)
    }

    /// Computes the admin dashboard figures.
    #[tracing::instrument(skip(self))]
    pub async fn sales_summary(&self) -> Result<SalesSummary> {
        Ok(self.store.sales_summary().await?)
    }
}
