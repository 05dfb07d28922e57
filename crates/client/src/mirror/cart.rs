//! Cart screen and checkout.

use gearhub_core::models::{Cart, CheckoutReceipt, CheckoutRequest};
use gearhub_core::validation::{validate_checkout, validate_quantity};
use gearhub_core::VariantId;
use rust_decimal::Decimal;

use super::{Access, Mirror, MirrorError};
use crate::client::ApiClient;

/// The signed-in user's cart.
///
/// Server figures are authoritative and never rewritten locally. A
/// confirmed quantity change or removal patches the lines only, and the
/// cart counts as unreconciled until the next fetch replaces it.
#[derive(Debug, Default)]
pub struct CartScreen {
    mirror: Mirror<Cart>,
    pending_reconcile: bool,
}

impl CartScreen {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mirror: Mirror::new(),
            pending_reconcile: false,
        }
    }

    #[must_use]
    pub const fn mirror(&self) -> &Mirror<Cart> {
        &self.mirror
    }

    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.mirror.data()
    }

    /// Local estimate of the total; zero before the first load.
    #[must_use]
    pub fn advisory_total(&self) -> Decimal {
        self.cart().map_or(Decimal::ZERO, Cart::advisory_total)
    }

    /// Whether the server figures can be trusted as shown: no local patch
    /// is waiting for a fetch, and they match a local recomputation.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        !self.pending_reconcile && self.cart().is_none_or(Cart::is_reconciled)
    }

    /// Whether a confirmed local patch is waiting for the next fetch.
    #[must_use]
    pub const fn is_pending_reconcile(&self) -> bool {
        self.pending_reconcile
    }

    fn adopt(&mut self, cart: Cart) {
        self.mirror.set_loaded(cart);
        self.pending_reconcile = false;
    }

    /// # Errors
    ///
    /// Returns `MirrorError::NotSignedIn` without any network call, or the
    /// fetch error.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        Access::SignedIn.check(client).await?;
        let generation = self.mirror.begin_fetch();
        let result = client.get_cart().await;
        if self.mirror.settle(generation, result)? {
            self.pending_reconcile = false;
        }
        Ok(())
    }

    /// Add a variant; the cart the server returns replaces the local one.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `MirrorError::NotSignedIn`, or the server
    /// error (for example insufficient stock).
    pub async fn add(
        &mut self,
        client: &ApiClient,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<(), MirrorError> {
        if let Err(err) = validate_quantity(quantity) {
            return Err(self.mirror.refuse(err.into()));
        }
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.add_to_cart(variant_id, quantity).await;
        let response = self.mirror.end_mutation(result)?;
        self.adopt(response.data);
        Ok(())
    }

    /// Change a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `MirrorError::NotSignedIn`, or the server
    /// error. Local state is unchanged on error.
    pub async fn change_quantity(
        &mut self,
        client: &ApiClient,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<(), MirrorError> {
        if let Err(err) = validate_quantity(quantity) {
            return Err(self.mirror.refuse(err.into()));
        }
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.update_cart_quantity(variant_id, quantity).await;
        self.mirror.end_mutation(result)?;
        if let Some(cart) = self.mirror.data_mut() {
            self.pending_reconcile |= cart.apply_quantity(variant_id, quantity);
        }
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotSignedIn` or the server error.
    pub async fn remove(&mut self, client: &ApiClient, variant_id: VariantId) -> Result<(), MirrorError> {
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.remove_from_cart(variant_id).await;
        self.mirror.end_mutation(result)?;
        if let Some(cart) = self.mirror.data_mut() {
            self.pending_reconcile |= cart.remove_line(variant_id);
        }
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotSignedIn` or the server error.
    pub async fn clear(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.clear_cart().await;
        self.mirror.end_mutation(result)?;
        self.adopt(Cart::default());
        Ok(())
    }

    /// Place an order for the cart's contents. The server empties the cart;
    /// so does the local copy once the order is confirmed.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `MirrorError::NotOffered` for an empty
    /// loaded cart, `MirrorError::NotSignedIn`, or the server error.
    pub async fn checkout(
        &mut self,
        client: &ApiClient,
        form: &CheckoutRequest,
    ) -> Result<CheckoutReceipt, MirrorError> {
        if let Err(err) = validate_checkout(form) {
            return Err(self.mirror.refuse(err.into()));
        }
        if self.cart().is_some_and(Cart::is_empty) {
            return Err(self.mirror.refuse(MirrorError::NotOffered("your cart is empty")));
        }
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.checkout(form).await;
        let response = self.mirror.end_mutation(result)?;
        self.adopt(Cart::default());
        tracing::info!(order_id = %response.data.order_id, "order placed");
        Ok(response.data)
    }
}
