//! GearHub Core - Shared types library.
//!
//! This crate provides the types used across all GearHub components:
//! - `client` - Typed REST client, session handling and screen state
//! - `cli` - Command-line storefront and back-office
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Ids, statuses, roles, pagination and the response envelope
//! - [`models`] - Resource payloads (products, cart, orders, categories, ...)
//! - [`validation`] - Client-side form checks mirroring backend constraints

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use types::*;
