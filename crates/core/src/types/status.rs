//! Status and role enumerations shared by the client and its screens.
//!
//! The backend identifies order statuses and roles by numeric id on writes
//! and by upper-case name on display; both directions are provided here.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Numeric ids `1..=7` are the values the backend expects on status writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Every status in id order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
    ];

    /// Numeric status id used on writes.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Pending => 1,
            Self::Confirmed => 2,
            Self::Processing => 3,
            Self::Shipped => 4,
            Self::Delivered => 5,
            Self::Cancelled => 6,
            Self::Refunded => 7,
        }
    }

    /// Look up a status by its numeric id.
    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Confirmed),
            3 => Some(Self::Processing),
            4 => Some(Self::Shipped),
            5 => Some(Self::Delivered),
            6 => Some(Self::Cancelled),
            7 => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Wire name, e.g. `PENDING`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Human label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
        }
    }

    /// Customers may only cancel orders that have not started processing.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Self::from_id(id).ok_or_else(|| format!("invalid order status id: {id}"));
        }
        let upper = trimmed.to_ascii_uppercase();
        // "canceled" is the spelling the admin filter uses
        let normalized = if upper == "CANCELED" {
            "CANCELLED"
        } else {
            upper.as_str()
        };
        Self::ALL
            .into_iter()
            .find(|status| status.code() == normalized)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Optional status filter for order list screens.
///
/// `all` (or an empty string) means no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// The `statusId` query value, if any.
    #[must_use]
    pub const fn status_id(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status.id()),
        }
    }

    /// Whether an order with `status` passes this filter.
    #[must_use]
    pub fn matches(self, status: Option<OrderStatus>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => status == Some(wanted),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Only)
    }
}

impl From<Option<OrderStatus>> for StatusFilter {
    fn from(status: Option<OrderStatus>) -> Self {
        status.map_or(Self::All, Self::Only)
    }
}

/// Account role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    /// Full access to the back-office.
    Admin,
    /// Staff access: product lookup and order handling.
    Moderator,
    /// Regular customer.
    User,
    /// Anonymous visitor.
    Guest,
}

impl Role {
    /// Numeric role id.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Admin => 1,
            Self::Moderator => 2,
            Self::User => 3,
            Self::Guest => 4,
        }
    }

    /// Admin screens require this.
    #[must_use]
    pub const fn can_administer(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Staff screens accept admins as well as moderators.
    #[must_use]
    pub const fn can_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }
}

impl TryFrom<i64> for Role {
    type Error = String;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Admin),
            2 => Ok(Self::Moderator),
            3 => Ok(Self::User),
            4 => Ok(Self::Guest),
            _ => Err(format!("invalid role id: {id}")),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.id()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Moderator => write!(f, "moderator"),
            Self::User => write!(f, "user"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "moderator" | "staff" => Ok(Self::Moderator),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Support ticket workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}
