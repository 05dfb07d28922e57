//! Request and response payloads exchanged with the backend.
//!
//! Field names follow the backend's camelCase JSON.

pub mod auth;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod profile;
pub mod support;

pub use auth::*;
pub use cart::*;
pub use category::*;
pub use order::*;
pub use product::*;
pub use profile::*;
pub use support::*;
