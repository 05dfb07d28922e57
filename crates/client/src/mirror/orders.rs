//! Order list and order detail screens for customers, staff and admins.

use std::cmp::Reverse;

use gearhub_core::models::{HasOrderStatus, OrderDetail, OrderSummary};
use gearhub_core::validation::validate_cancel_reason;
use gearhub_core::{ApiResponse, OrderId, OrderStatus, Page, StatusFilter};

use super::{Access, Generation, Mirror, MirrorError};
use crate::client::ApiClient;
use crate::error::ClientError;

/// Whose orders a screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// The signed-in customer's own orders.
    Mine,
    /// All orders, staff view.
    Staff,
    /// All orders, admin view.
    Admin,
}

impl OrderScope {
    const fn access(self) -> Access {
        match self {
            Self::Mine => Access::SignedIn,
            Self::Staff => Access::Staff,
            Self::Admin => Access::Admin,
        }
    }

    /// Run the listing call for this scope.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn list(
        self,
        client: &ApiClient,
        page: u32,
        size: u32,
        filter: StatusFilter,
    ) -> Result<ApiResponse<Page<OrderSummary>>, ClientError> {
        match self {
            Self::Mine => client.list_orders(page, size, filter).await,
            Self::Staff => client.staff_list_orders(page, size, filter).await,
            Self::Admin => client.admin_list_orders(page, size, filter).await,
        }
    }

    async fn get(
        self,
        client: &ApiClient,
        id: OrderId,
    ) -> Result<ApiResponse<OrderDetail>, ClientError> {
        match self {
            Self::Mine => client.get_order(id).await,
            Self::Staff => client.staff_get_order(id).await,
            Self::Admin => client.admin_get_order(id).await,
        }
    }

    async fn update_status(
        self,
        client: &ApiClient,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<ApiResponse<OrderDetail>, ClientError> {
        match self {
            Self::Staff => client.staff_update_order_status(id, status).await,
            _ => client.admin_update_order_status(id, status).await,
        }
    }
}

/// An issued order list fetch.
#[derive(Debug, Clone, Copy)]
pub struct OrderFetch {
    generation: Generation,
    pub page: u32,
    pub size: u32,
    pub filter: StatusFilter,
}

/// Paginated order list with a status filter.
#[derive(Debug)]
pub struct OrderListScreen {
    scope: OrderScope,
    page: u32,
    size: u32,
    filter: StatusFilter,
    mirror: Mirror<Page<OrderSummary>>,
}

impl OrderListScreen {
    #[must_use]
    pub const fn new(scope: OrderScope, size: u32) -> Self {
        Self {
            scope,
            page: 0,
            size,
            filter: StatusFilter::All,
            mirror: Mirror::new(),
        }
    }

    #[must_use]
    pub const fn scope(&self) -> OrderScope {
        self.scope
    }

    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn filter(&self) -> StatusFilter {
        self.filter
    }

    #[must_use]
    pub const fn mirror(&self) -> &Mirror<Page<OrderSummary>> {
        &self.mirror
    }

    #[must_use]
    pub const fn page(&self) -> Option<&Page<OrderSummary>> {
        self.mirror.data()
    }

    /// Change the status filter. Resets to the first page when it changes.
    pub fn set_filter(&mut self, filter: StatusFilter) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        self.page = 0;
        true
    }

    /// Change the status filter from text: `all` or a status name.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::InvalidInput` for an unknown status.
    pub fn set_filter_text(&mut self, text: &str) -> Result<bool, MirrorError> {
        let filter = text.parse().map_err(MirrorError::InvalidInput)?;
        Ok(self.set_filter(filter))
    }

    /// Jump to a zero-based page.
    pub fn set_page(&mut self, page: u32) -> bool {
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    /// Issue a fetch for the current inputs.
    pub fn begin_fetch(&mut self) -> OrderFetch {
        OrderFetch {
            generation: self.mirror.begin_fetch(),
            page: self.page,
            size: self.size,
            filter: self.filter,
        }
    }

    /// Apply a fetch result; stale results are dropped.
    pub fn finish(
        &mut self,
        fetch: OrderFetch,
        result: Result<ApiResponse<Page<OrderSummary>>, ClientError>,
    ) -> bool {
        self.mirror.finish(fetch.generation, result)
    }

    /// Fetch the current inputs to completion.
    ///
    /// # Errors
    ///
    /// Returns an access error without any network call when the session
    /// lacks the scope's role, or the fetch error.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        self.scope.access().check(client).await?;
        let fetch = self.begin_fetch();
        let result = self
            .scope
            .list(client, fetch.page, fetch.size, fetch.filter)
            .await;
        self.mirror.settle(fetch.generation, result).map(|_| ())
    }

    /// Loaded orders passing `filter`, newest (or oldest) first.
    #[must_use]
    pub fn visible(&self, filter: StatusFilter, newest_first: bool) -> Vec<&OrderSummary> {
        let mut orders: Vec<&OrderSummary> = self
            .page()
            .map(|p| p.items.iter().filter(|o| filter.matches(o.status())).collect())
            .unwrap_or_default();
        if newest_first {
            orders.sort_by_key(|o| Reverse(o.created_at));
        } else {
            orders.sort_by_key(|o| o.created_at);
        }
        orders
    }

    /// Move an order to `status`; the row is patched once the server
    /// confirms.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotOffered` for the customer scope, an access
    /// error, or the server error.
    pub async fn update_status(
        &mut self,
        client: &ApiClient,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), MirrorError> {
        if self.scope == OrderScope::Mine {
            return Err(self
                .mirror
                .refuse(MirrorError::NotOffered("customers cannot change order status")));
        }
        self.scope.access().check(client).await?;
        self.mirror.begin_mutation()?;
        let result = self.scope.update_status(client, id, status).await;
        self.mirror.end_mutation(result)?;
        self.patch_status(id, status);
        Ok(())
    }

    /// Cancel one of the customer's orders.
    ///
    /// Only offered for the customer scope and for rows whose status is
    /// PENDING or CONFIRMED.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotOffered` when cancellation is not available,
    /// a validation error for a blank reason, or the server error.
    pub async fn cancel(
        &mut self,
        client: &ApiClient,
        id: OrderId,
        reason: &str,
    ) -> Result<(), MirrorError> {
        let offered = self.scope == OrderScope::Mine
            && self
                .page()
                .and_then(|p| p.items.iter().find(|o| o.order_id == id))
                .is_some_and(HasOrderStatus::can_cancel);
        if !offered {
            return Err(self
                .mirror
                .refuse(MirrorError::NotOffered("this order cannot be cancelled")));
        }
        if let Err(err) = validate_cancel_reason(reason) {
            return Err(self.mirror.refuse(err.into()));
        }
        self.mirror.begin_mutation()?;
        let result = client.cancel_order(id, reason).await;
        self.mirror.end_mutation(result)?;
        self.patch_status(id, OrderStatus::Cancelled);
        Ok(())
    }

    /// Whether the cancel control should be shown for `id`.
    #[must_use]
    pub fn can_cancel(&self, id: OrderId) -> bool {
        self.scope == OrderScope::Mine
            && self
                .page()
                .and_then(|p| p.items.iter().find(|o| o.order_id == id))
                .is_some_and(HasOrderStatus::can_cancel)
    }

    fn patch_status(&mut self, id: OrderId, status: OrderStatus) {
        if let Some(order) = self
            .mirror
            .data_mut()
            .and_then(|p| p.items.iter_mut().find(|o| o.order_id == id))
        {
            order.set_status(status);
        }
    }
}

/// One order with its lines.
#[derive(Debug)]
pub struct OrderDetailScreen {
    scope: OrderScope,
    order_id: OrderId,
    mirror: Mirror<OrderDetail>,
}

impl OrderDetailScreen {
    #[must_use]
    pub const fn new(scope: OrderScope, order_id: OrderId) -> Self {
        Self {
            scope,
            order_id,
            mirror: Mirror::new(),
        }
    }

    #[must_use]
    pub const fn mirror(&self) -> &Mirror<OrderDetail> {
        &self.mirror
    }

    #[must_use]
    pub const fn order(&self) -> Option<&OrderDetail> {
        self.mirror.data()
    }

    /// # Errors
    ///
    /// Returns an access error without any network call, or the fetch error.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        self.scope.access().check(client).await?;
        let generation = self.mirror.begin_fetch();
        let result = self.scope.get(client, self.order_id).await;
        self.mirror.settle(generation, result).map(|_| ())
    }

    /// Whether the cancel control should be shown: only customers, and only
    /// for PENDING or CONFIRMED orders.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.scope == OrderScope::Mine && self.order().is_some_and(HasOrderStatus::can_cancel)
    }

    /// Cancel this order with a reason. The status becomes CANCELLED once the
    /// server confirms.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotOffered` when [`Self::can_cancel`] is false,
    /// a validation error for a blank reason, or the server error.
    pub async fn cancel(&mut self, client: &ApiClient, reason: &str) -> Result<(), MirrorError> {
        if !self.can_cancel() {
            return Err(self
                .mirror
                .refuse(MirrorError::NotOffered("this order cannot be cancelled")));
        }
        if let Err(err) = validate_cancel_reason(reason) {
            return Err(self.mirror.refuse(err.into()));
        }
        self.mirror.begin_mutation()?;
        let result = client.cancel_order(self.order_id, reason).await;
        self.mirror.end_mutation(result)?;
        if let Some(order) = self.mirror.data_mut() {
            order.set_status(OrderStatus::Cancelled);
        }
        Ok(())
    }

    /// Move this order to `status` (staff and admin only). The server's
    /// updated order replaces the local copy.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotOffered` for the customer scope, an access
    /// error, or the server error.
    pub async fn update_status(
        &mut self,
        client: &ApiClient,
        status: OrderStatus,
    ) -> Result<(), MirrorError> {
        if self.scope == OrderScope::Mine {
            return Err(self
                .mirror
                .refuse(MirrorError::NotOffered("customers cannot change order status")));
        }
        self.scope.access().check(client).await?;
        self.mirror.begin_mutation()?;
        let result = self.scope.update_status(client, self.order_id, status).await;
        let response = self.mirror.end_mutation(result)?;
        let mut order = response.data;
        if order.status() != Some(status) {
            order.set_status(status);
        }
        self.mirror.set_loaded(order);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    fn order(id: i64, status: OrderStatus, day: u32) -> OrderSummary {
        OrderSummary {
            order_id: OrderId::new(id),
            user_id: None,
            total_price: Decimal::new(100, 0),
            shipping_address: None,
            status_id: Some(status.id()),
            status_name: Some(status.code().to_string()),
            created_at: NaiveDate::from_ymd_opt(2025, 1, day).and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }

    fn loaded(scope: OrderScope, orders: Vec<OrderSummary>) -> OrderListScreen {
        let mut screen = OrderListScreen::new(scope, 10);
        let fetch = screen.begin_fetch();
        screen.finish(fetch, Ok(ApiResponse::ok("", Page::window(&orders, 0, 10))));
        screen
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut screen = OrderListScreen::new(OrderScope::Admin, 10);
        screen.set_page(3);
        assert!(screen.set_filter(StatusFilter::Only(OrderStatus::Shipped)));
        assert_eq!(screen.page_index(), 0);

        screen.set_page(2);
        assert!(!screen.set_filter(StatusFilter::Only(OrderStatus::Shipped)));
        assert_eq!(screen.page_index(), 2);

        assert!(screen.set_filter_text("all").expect("valid"));
        assert_eq!(screen.page_index(), 0);
        assert_eq!(screen.filter().status_id(), None);
        assert!(screen.set_filter_text("bogus").is_err());
    }

    #[test]
    fn test_fetch_carries_filter() {
        let mut screen = OrderListScreen::new(OrderScope::Staff, 20);
        screen.set_filter_text("delivered").expect("valid");
        let fetch = screen.begin_fetch();
        assert_eq!(fetch.filter.status_id(), Some(5));
        assert_eq!(fetch.size, 20);
    }

    #[test]
    fn test_cancel_offered_only_for_pending_and_confirmed() {
        let screen = loaded(
            OrderScope::Mine,
            OrderStatus::ALL
                .into_iter()
                .enumerate()
                .map(|(i, s)| order(i as i64 + 1, s, 1))
                .collect(),
        );
        let offered: Vec<_> = OrderStatus::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| screen.can_cancel(OrderId::new(*i as i64 + 1)))
            .map(|(_, s)| s)
            .collect();
        assert_eq!(offered, vec![OrderStatus::Pending, OrderStatus::Confirmed]);
    }

    #[test]
    fn test_staff_scope_never_offers_cancel() {
        let screen = loaded(OrderScope::Staff, vec![order(1, OrderStatus::Pending, 1)]);
        assert!(!screen.can_cancel(OrderId::new(1)));
    }

    #[test]
    fn test_visible_filters_and_sorts_in_memory() {
        let screen = loaded(
            OrderScope::Admin,
            vec![
                order(1, OrderStatus::Pending, 3),
                order(2, OrderStatus::Shipped, 5),
                order(3, OrderStatus::Pending, 9),
            ],
        );
        let ids = |orders: Vec<&OrderSummary>| -> Vec<i64> {
            orders.into_iter().map(|o| o.order_id.as_i64()).collect()
        };
        assert_eq!(ids(screen.visible(StatusFilter::All, true)), vec![3, 2, 1]);
        assert_eq!(
            ids(screen.visible(StatusFilter::Only(OrderStatus::Pending), false)),
            vec![1, 3]
        );
    }
}
