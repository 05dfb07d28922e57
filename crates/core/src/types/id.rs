//! Newtype IDs for type-safe resource references.
//!
//! Identifiers are assigned by the backend and are always positive. A record
//! created locally before the backend has confirmed it carries a negative
//! temporary id instead (see [`TemporaryIds`]).

use std::sync::atomic::{AtomicI64, Ordering};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use gearhub_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget = WidgetId::new(1);
/// let gadget = GadgetId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget;
/// assert!(widget.is_server_assigned());
/// assert_eq!(gadget.as_i64(), 1);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }

            /// Whether the backend assigned this id (positive values only).
            #[must_use]
            pub const fn is_server_assigned(&self) -> bool {
                self.0 > 0
            }

            /// Whether this is a local placeholder awaiting a server id.
            #[must_use]
            pub const fn is_temporary(&self) -> bool {
                self.0 < 0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(OrderId);
define_id!(CartId);
define_id!(CategoryId);
define_id!(BrandId);
define_id!(VoucherId);
define_id!(FaqId);
define_id!(TicketId);

/// Generator for temporary (negative) ids.
///
/// Each call to [`TemporaryIds::allocate`] returns a value strictly lower than
/// every value it returned before, so placeholders are never reused.
#[derive(Debug)]
pub struct TemporaryIds {
    next: AtomicI64,
}

impl TemporaryIds {
    /// Create a generator starting at `-1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicI64::new(-1),
        }
    }

    /// Allocate the next temporary id.
    pub fn allocate<T: From<i64>>(&self) -> T {
        T::from(self.next.fetch_sub(1, Ordering::Relaxed))
    }
}

impl Default for TemporaryIds {
    fn default() -> Self {
        Self::new()
    }
}
