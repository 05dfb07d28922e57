//! Shopping cart and checkout payloads.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartId, OrderId, ProductId, VariantId, VoucherId};

/// One line of the cart.
///
/// `subtotal` comes from the backend and is the source of truth;
/// [`CartLine::advisory_subtotal`] is a local estimate shown next to it
/// between a confirmed mutation and the next fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<CartId>,
    pub variant_id: VariantId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, alias = "imageUrl")]
    pub product_image_url: Option<String>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(alias = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<NaiveDateTime>,
}

impl CartLine {
    /// `unit_price * quantity`, computed locally.
    #[must_use]
    pub fn advisory_subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Whether the backend subtotal agrees with the local computation.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.subtotal == self.advisory_subtotal()
    }
}

/// The user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_price: Decimal,
}

impl Cart {
    /// Look up the line for a variant.
    #[must_use]
    pub fn line(&self, variant_id: VariantId) -> Option<&CartLine> {
        self.items.iter().find(|l| l.variant_id == variant_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the local per-line estimates.
    #[must_use]
    pub fn advisory_total(&self) -> Decimal {
        self.items.iter().map(CartLine::advisory_subtotal).sum()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn advisory_item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Whether every figure agrees with what a local recomputation gives.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.items.iter().all(CartLine::is_reconciled)
            && self.total_price == self.advisory_total()
            && self.total_items == self.advisory_item_count()
    }

    /// Set a line's quantity after the server confirmed the change.
    ///
    /// The server's subtotal and totals are left as they were; until the
    /// next fetch they disagree with the advisory figures.
    /// Returns `false` when the variant is not in the cart.
    pub fn apply_quantity(&mut self, variant_id: VariantId, quantity: u32) -> bool {
        let Some(line) = self.items.iter_mut().find(|l| l.variant_id == variant_id) else {
            return false;
        };
        line.quantity = quantity;
        true
    }

    /// Drop a line after the server confirmed the removal.
    ///
    /// Server totals are kept. Returns `false` when the variant is not in
    /// the cart.
    pub fn remove_line(&mut self, variant_id: VariantId) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.variant_id != variant_id);
        self.items.len() != before
    }
}

/// Request body for adding a variant to the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Request body for changing a line quantity.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_id: Option<VoucherId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Summary of the order created by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub total_price: Decimal,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
