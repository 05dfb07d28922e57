//! Order payloads.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderStatus, ProductId, UserId, VariantId, VoucherId};

/// Order as shown in list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub total_price: Decimal,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default, alias = "status")]
    pub status_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Full order detail with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order_id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub total_price: Decimal,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default, alias = "status")]
    pub status_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub voucher_id: Option<VoucherId>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub order_detail_id: Option<i64>,
    pub variant_id: VariantId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub attributes: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub warranty_months: Option<u32>,
}

impl OrderLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Shared view over the status fields of list and detail payloads.
pub trait HasOrderStatus {
    /// Numeric status id, if the backend sent one.
    fn status_id(&self) -> Option<i64>;
    /// Status name, if the backend sent one.
    fn status_name(&self) -> Option<&str>;
    /// Overwrite both status fields.
    fn set_status(&mut self, status: OrderStatus);

    /// Resolved status: numeric id first, then name.
    fn status(&self) -> Option<OrderStatus> {
        self.status_id()
            .and_then(OrderStatus::from_id)
            .or_else(|| self.status_name().and_then(|n| n.parse().ok()))
    }

    /// Whether the customer may cancel this order.
    fn can_cancel(&self) -> bool {
        self.status().is_some_and(OrderStatus::is_cancellable)
    }

    /// Label for display, falling back to the raw name.
    fn status_label(&self) -> String {
        self.status().map_or_else(
            || self.status_name().unwrap_or("Unknown").to_string(),
            |s| s.label().to_string(),
        )
    }
}

macro_rules! impl_has_order_status {
    ($ty:ty) => {
        impl HasOrderStatus for $ty {
            fn status_id(&self) -> Option<i64> {
                self.status_id
            }

            fn status_name(&self) -> Option<&str> {
                self.status_name.as_deref()
            }

            fn set_status(&mut self, status: OrderStatus) {
                self.status_id = Some(status.id());
                self.status_name = Some(status.code().to_string());
            }
        }
    };
}

impl_has_order_status!(OrderSummary);
impl_has_order_status!(OrderDetail);

/// Request body for a status transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status_id: i64,
}

/// Request body for a customer cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct CancelOrderRequest {
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(status_id: Option<i64>, status_name: Option<&str>) -> OrderSummary {
        OrderSummary {
            order_id: OrderId::new(1),
            user_id: None,
            total_price: Decimal::new(1000, 0),
            shipping_address: None,
            status_id,
            status_name: status_name.map(str::to_string),
            created_at: None,
        }
    }

    #[test]
    fn test_status_prefers_numeric_id() {
        let order = summary(Some(4), Some("PENDING"));
        assert_eq!(order.status(), Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_status_falls_back_to_name() {
        let order = summary(None, Some("CONFIRMED"));
        assert_eq!(order.status(), Some(OrderStatus::Confirmed));
        assert!(order.can_cancel());
    }

    #[test]
    fn test_unknown_status_is_not_cancellable() {
        let order = summary(None, Some("ON_HOLD"));
        assert_eq!(order.status(), None);
        assert!(!order.can_cancel());
        assert_eq!(order.status_label(), "ON_HOLD");
    }

    #[test]
    fn test_set_status_updates_both_fields() {
        let mut order = summary(Some(1), Some("PENDING"));
        order.set_status(OrderStatus::Cancelled);
        assert_eq!(order.status_id, Some(6));
        assert_eq!(order.status_name.as_deref(), Some("CANCELLED"));
        assert!(!order.can_cancel());
    }

    #[test]
    fn test_detail_decodes_items() {
        let json = r#"{
            "orderId": 5,
            "totalPrice": 300,
            "statusId": 1,
            "statusName": "PENDING",
            "items": [
                {"variantId": 2, "productId": 1, "productName": "Mouse", "sku": "M-1", "quantity": 3, "unitPrice": 100}
            ],
            "createdAt": "2025-03-01T10:15:30"
        }"#;
        let order: OrderDetail = serde_json::from_str(json).expect("deserialize");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].subtotal(), Decimal::new(300, 0));
        assert!(order.created_at.is_some());
    }
}
