//! Typed façade over the transport: one method per backend operation.
//!
//! Methods return the decoded envelope so callers can show the server's
//! message. Errors propagate unchanged, except for the two read paths with a
//! demo fallback ([`ApiClient::login`] and the product listings), which
//! substitute [`fallback`](crate::fallback) data when the fallback is enabled
//! and the backend is unavailable.
//!
//! Operations are grouped by resource family:
//! - `auth` - login, registration, logout and the profile
//! - `catalog` - public product browsing
//! - `cart` - cart lines and checkout
//! - `orders` - the signed-in user's orders
//! - `staff` - staff product lookup and order handling
//! - `admin` - product, order and category administration

mod admin;
mod auth;
mod cart;
mod catalog;
mod orders;
mod staff;

use std::future::Future;
use std::sync::Arc;

use gearhub_core::models::{ProductQuery, ProductSummary};
use gearhub_core::{ApiResponse, Page, StatusFilter};

pub use admin::{ImageUpload, ProductUpload};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::fallback::{self, DemoMode};
use crate::session::{SessionStore, SessionUser};
use crate::transport::{Query, Transport};

/// GearHub REST API client.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    transport: Transport,
    session: SessionStore,
    demo: DemoMode,
    demo_fallback: bool,
}

impl ApiClient {
    /// Create a client for `config` sharing `session` with the rest of the
    /// application.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        let transport = Transport::new(config, session.clone())?;
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                transport,
                session,
                demo: DemoMode::new(),
                demo_fallback: config.demo_fallback,
            }),
        })
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Demo mode marker shared with every clone of this client.
    #[must_use]
    pub fn demo_mode(&self) -> &DemoMode {
        &self.inner.demo
    }

    #[must_use]
    pub fn demo_fallback_enabled(&self) -> bool {
        self.inner.demo_fallback
    }

    /// Signed-in user, if any.
    pub async fn current_user(&self) -> Option<SessionUser> {
        self.inner.session.user().await
    }

    fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    /// Whether `err` should be answered from demo data.
    fn should_fall_back(&self, err: &ClientError) -> bool {
        self.inner.demo_fallback && err.is_backend_unavailable()
    }

    /// Run a product listing, answering from demo data if the backend is
    /// down and the fallback is enabled.
    async fn products_with_fallback<F>(
        &self,
        request: F,
        query: &ProductQuery,
    ) -> Result<ApiResponse<Page<ProductSummary>>, ClientError>
    where
        F: Future<Output = Result<ApiResponse<Page<ProductSummary>>, ClientError>>,
    {
        match request.await {
            Err(err) if self.should_fall_back(&err) => {
                tracing::warn!(error = %err, "product listing failed, using demo data");
                self.inner.demo.activate();
                Ok(fallback::product_page(query))
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("transport", &self.inner.transport)
            .field("demo_fallback", &self.inner.demo_fallback)
            .finish_non_exhaustive()
    }
}

/// `page` and `size` query parameters.
fn paging(page: u32, size: u32) -> Query {
    vec![("page", page.to_string()), ("size", size.to_string())]
}

/// Paging plus an optional trimmed keyword.
fn keyword_paging(page: u32, size: u32, keyword: Option<&str>) -> Query {
    let mut query = paging(page, size);
    if let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
        query.push(("keyword", keyword.to_string()));
    }
    query
}

/// Paging plus an optional status id.
fn status_paging(page: u32, size: u32, status: StatusFilter) -> Query {
    let mut query = paging(page, size);
    if let Some(id) = status.status_id() {
        query.push(("statusId", id.to_string()));
    }
    query
}
