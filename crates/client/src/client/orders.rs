//! The signed-in user's orders.

use gearhub_core::models::{CancelOrderRequest, OrderDetail, OrderSummary};
use gearhub_core::{ApiResponse, OrderId, Page, StatusFilter};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::{ApiClient, status_paging};
use crate::error::ClientError;

impl ApiClient {
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u32,
        size: u32,
        status: StatusFilter,
    ) -> Result<ApiResponse<Page<OrderSummary>>, ClientError> {
        self.transport()
            .get("/user/orders", &status_paging(page, size, status))
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<ApiResponse<OrderDetail>, ClientError> {
        self.transport().get(&format!("/user/orders/{id}"), &[]).await
    }

    /// Ask the server to cancel an order.
    ///
    /// Whether cancellation is offered at all is a screen decision; see
    /// [`OrderDetailScreen::cancel`](crate::mirror::OrderDetailScreen::cancel).
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self, reason))]
    pub async fn cancel_order(
        &self,
        id: OrderId,
        reason: &str,
    ) -> Result<ApiResponse<()>, ClientError> {
        let body = CancelOrderRequest {
            reason: reason.to_string(),
        };
        let response: ApiResponse<IgnoredAny> = self
            .transport()
            .put(&format!("/user/orders/{id}/cancel"), &body)
            .await?;
        Ok(response.map(|_| ()))
    }
}
