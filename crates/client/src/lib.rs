//! GearHub Client - REST access and screen state for the GearHub backend.
//!
//! # Layers
//!
//! - [`transport`] - HTTP round trips, bearer auth and envelope decoding
//! - [`client`] - [`ApiClient`], one typed method per backend operation
//! - [`session`] - the signed-in user, persisted across runs
//! - [`fallback`] - demo accounts and demo catalog for an unreachable backend
//! - [`mirror`] - per-screen copies of server state
//!
//! # Example
//!
//! ```rust,ignore
//! use gearhub_client::{ApiClient, ClientConfig, SessionStore};
//!
//! let config = ClientConfig::from_env()?;
//! let client = ApiClient::new(&config, SessionStore::in_memory())?;
//! let page = client.list_products(&ProductQuery::new(12)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod mirror;
pub mod session;
pub mod transport;

pub use client::{ApiClient, ImageUpload, ProductUpload};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use fallback::DemoMode;
pub use session::{FileSessionStorage, MemorySessionStorage, SessionStore, SessionUser, StorageError};
