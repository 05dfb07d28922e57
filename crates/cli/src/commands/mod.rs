//! CLI subcommands. Each one drives a screen from `gearhub_client::mirror`
//! and reports through `tracing`.

pub mod account;
pub mod admin;
pub mod auth;
pub mod orders;
pub mod shop;

use std::sync::Arc;

use gearhub_client::mirror::MirrorError;
use gearhub_client::{
    ApiClient, ClientConfig, ClientError, FileSessionStorage, SessionStore, StorageError,
};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Stored session could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Client construction or request failure.
    #[error("{}", .0.message())]
    Client(#[from] ClientError),

    /// A screen refused the action or the server rejected it.
    #[error("{}", .0.message())]
    Screen(#[from] MirrorError),

    /// An argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image file for an upload could not be read.
    #[error("Cannot read image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build a client whose session is persisted in the configured file and
/// restore any session left by a previous run.
///
/// # Errors
///
/// Returns an error if the session file is unreadable or the client cannot
/// be built.
pub async fn connect(config: &ClientConfig) -> Result<ApiClient, CommandError> {
    let storage = Arc::new(FileSessionStorage::new(config.session_file.clone()));
    let session = SessionStore::new(storage);
    if let Some(user) = session.restore().await? {
        tracing::debug!(username = %user.username, role = %user.role, "restored session");
    }
    Ok(ApiClient::new(config, session)?)
}

/// Format a price for display.
pub fn money(amount: Decimal) -> String {
    format!("{} ₫", amount.round_dp(0))
}

/// Warn once per command when results came from demo data.
pub fn note_demo(client: &ApiClient) {
    if client.demo_mode().is_active() {
        tracing::warn!("Backend unreachable; results are demo data");
    }
}
