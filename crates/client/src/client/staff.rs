//! Staff scope: product lookup and order handling.

use gearhub_core::models::{
    OrderDetail, OrderSummary, ProductDetail, ProductQuery, ProductSummary,
    UpdateOrderStatusRequest,
};
use gearhub_core::{ApiResponse, OrderId, OrderStatus, Page, ProductId, StatusFilter};
use tracing::instrument;

use super::{ApiClient, keyword_paging, status_paging};
use crate::error::ClientError;

impl ApiClient {
    /// Staff product listing. Falls back to the demo catalog like the public
    /// listing.
    ///
    /// # Errors
    ///
    /// Returns the transport error when no fallback applies.
    #[instrument(skip(self))]
    pub async fn staff_list_products(
        &self,
        page: u32,
        size: u32,
        keyword: Option<&str>,
    ) -> Result<ApiResponse<Page<ProductSummary>>, ClientError> {
        let params = keyword_paging(page, size, keyword);
        let query = ProductQuery {
            page,
            size,
            keyword: keyword.map(str::to_string),
            ..ProductQuery::default()
        };
        self.products_with_fallback(self.transport().get("/staff/product", &params), &query)
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn staff_get_product(
        &self,
        id: ProductId,
    ) -> Result<ApiResponse<ProductDetail>, ClientError> {
        self.transport()
            .get(&format!("/staff/product/{id}"), &[])
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn staff_list_orders(
        &self,
        page: u32,
        size: u32,
        status: StatusFilter,
    ) -> Result<ApiResponse<Page<OrderSummary>>, ClientError> {
        self.transport()
            .get("/staff/order", &status_paging(page, size, status))
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn staff_get_order(
        &self,
        id: OrderId,
    ) -> Result<ApiResponse<OrderDetail>, ClientError> {
        self.transport().get(&format!("/staff/order/{id}"), &[]).await
    }

    /// Move an order to `status`; the server returns the updated order.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn staff_update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<ApiResponse<OrderDetail>, ClientError> {
        let body = UpdateOrderStatusRequest {
            status_id: status.id(),
        };
        self.transport()
            .put(&format!("/staff/order/{id}/status"), &body)
            .await
    }
}
