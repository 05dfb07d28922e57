//! Cart and checkout. No demo fallback: failures reach the caller.

use gearhub_core::models::{
    AddToCartRequest, Cart, CheckoutReceipt, CheckoutRequest, UpdateQuantityRequest,
};
use gearhub_core::{ApiResponse, VariantId};
use tracing::instrument;

use super::ApiClient;
use crate::error::ClientError;

impl ApiClient {
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<ApiResponse<Cart>, ClientError> {
        self.transport().get("/user/cart", &[]).await
    }

    /// Add `quantity` of a variant; the server returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<ApiResponse<Cart>, ClientError> {
        let body = AddToCartRequest {
            variant_id,
            quantity,
        };
        self.transport().post("/user/cart", &body).await
    }

    /// Set the quantity of a cart line; the server returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn update_cart_quantity(
        &self,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<ApiResponse<Cart>, ClientError> {
        self.transport()
            .put(
                &format!("/user/cart/{variant_id}"),
                &UpdateQuantityRequest { quantity },
            )
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        variant_id: VariantId,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.transport()
            .delete(&format!("/user/cart/{variant_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<ApiResponse<()>, ClientError> {
        self.transport().delete("/user/cart").await
    }

    /// Turn the cart into an order.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self, form), fields(payment_method = %form.payment_method))]
    pub async fn checkout(
        &self,
        form: &CheckoutRequest,
    ) -> Result<ApiResponse<CheckoutReceipt>, ClientError> {
        self.transport().post("/user/checkout", form).await
    }
}
