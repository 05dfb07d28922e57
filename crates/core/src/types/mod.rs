//! Core types for GearHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod envelope;
pub mod id;
pub mod page;
pub mod status;

pub use envelope::ApiResponse;
pub use id::*;
pub use page::Page;
pub use status::*;
