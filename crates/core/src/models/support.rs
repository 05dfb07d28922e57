//! Back-office records without server endpoints: vouchers, FAQs and
//! support tickets. They live in local collections only.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{FaqId, TicketId, TicketStatus, UserId, VoucherId};

/// A record with an id that local collections can key on.
pub trait Keyed {
    /// Id type of the record.
    type Id: Copy + Eq + From<i64>;

    /// The record's id.
    fn id(&self) -> Self::Id;

    /// Replace the record's id.
    fn set_id(&mut self, id: Self::Id);
}

/// Discount voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub voucher_id: VoucherId,
    pub code: String,
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl Voucher {
    /// Discount this voucher gives on `subtotal`, capped at the subtotal.
    #[must_use]
    pub fn discount_on(&self, subtotal: Decimal) -> Decimal {
        if !self.is_active {
            return Decimal::ZERO;
        }
        let by_percent = self
            .discount_percent
            .map_or(Decimal::ZERO, |p| subtotal * p / Decimal::ONE_HUNDRED);
        let flat = self.discount_amount.unwrap_or(Decimal::ZERO);
        (by_percent + flat).min(subtotal)
    }
}

/// Frequently asked question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub faq_id: FaqId,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: String,
}

/// Customer support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub ticket_id: TicketId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub responses: Vec<String>,
}

macro_rules! impl_keyed {
    ($ty:ty, $id:ty, $field:ident) => {
        impl Keyed for $ty {
            type Id = $id;

            fn id(&self) -> Self::Id {
                self.$field
            }

            fn set_id(&mut self, id: Self::Id) {
                self.$field = id;
            }
        }
    };
}

impl_keyed!(Voucher, VoucherId, voucher_id);
impl_keyed!(Faq, FaqId, faq_id);
impl_keyed!(SupportTicket, TicketId, ticket_id);

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(percent: Option<i64>, amount: Option<i64>, active: bool) -> Voucher {
        Voucher {
            voucher_id: VoucherId::new(1),
            code: "SAVE".to_string(),
            discount_percent: percent.map(|p| Decimal::new(p, 0)),
            discount_amount: amount.map(|a| Decimal::new(a, 0)),
            description: None,
            is_active: active,
        }
    }

    #[test]
    fn test_percent_discount() {
        let v = voucher(Some(10), None, true);
        assert_eq!(v.discount_on(Decimal::new(2000, 0)), Decimal::new(200, 0));
    }

    #[test]
    fn test_discount_capped_at_subtotal() {
        let v = voucher(None, Some(500), true);
        assert_eq!(v.discount_on(Decimal::new(300, 0)), Decimal::new(300, 0));
    }

    #[test]
    fn test_inactive_voucher_gives_nothing() {
        let v = voucher(Some(50), Some(10), false);
        assert_eq!(v.discount_on(Decimal::new(100, 0)), Decimal::ZERO);
    }
}
