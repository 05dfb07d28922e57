//! Per-screen copies of server state.
//!
//! Each screen owns a [`Mirror`]: a small state machine
//! (`Idle -> Loading -> Loaded | Failed`) plus a mutation flag. Fetches are
//! tagged with a [`Generation`]; only the result of the most recently issued
//! fetch is applied, so a slow response can never overwrite fresher state.
//!
//! Screens expose both halves of a fetch (`begin_fetch` / `finish`) so that a
//! UI loop can keep several requests in flight, and a convenience `refresh`
//! that runs one fetch to completion.
//!
//! Mutations patch local state only after the server confirms them. A
//! failed mutation leaves state untouched and records the server's message
//! for the screen's inline error panel.

mod cart;
mod categories;
mod local;
mod orders;
mod products;
mod profile;

use gearhub_core::ApiResponse;
use gearhub_core::Role;
use gearhub_core::validation::ValidationError;
use thiserror::Error;

pub use cart::CartScreen;
pub use categories::CategoryScreen;
pub use local::LocalCollection;
pub use orders::{OrderDetailScreen, OrderFetch, OrderListScreen, OrderScope};
pub use products::{ProductDetailScreen, ProductFetch, ProductKey, ProductListScreen, ProductScope};
pub use profile::{ProfileScreen, register, sign_in};

use crate::client::ApiClient;
use crate::error::ClientError;

/// Screen-level failures.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("please sign in first")]
    NotSignedIn,
    #[error("access denied: {0} role required")]
    AccessDenied(&'static str),
    #[error("{0}")]
    NotOffered(&'static str),
    #[error("another change is still in progress")]
    Busy,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl MirrorError {
    /// Text for the screen's error panel.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Client(err) => err.message(),
            _ => self.to_string(),
        }
    }
}

/// Who may open a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any signed-in account.
    SignedIn,
    /// Admins and moderators.
    Staff,
    /// Admins only.
    Admin,
}

impl Access {
    /// Check the session's role. Makes no network call.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotSignedIn` or `MirrorError::AccessDenied`.
    pub async fn check(self, client: &ApiClient) -> Result<Role, MirrorError> {
        let role = client
            .session()
            .role()
            .await
            .ok_or(MirrorError::NotSignedIn)?;
        match self {
            Self::SignedIn => Ok(role),
            Self::Staff if role.can_staff() => Ok(role),
            Self::Admin if role.can_administer() => Ok(role),
            Self::Staff => Err(MirrorError::AccessDenied("staff")),
            Self::Admin => Err(MirrorError::AccessDenied("admin")),
        }
    }
}

/// Tag identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Fetch lifecycle of a screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

/// Screen-visible copy of one resource.
#[derive(Debug, Clone)]
pub struct Mirror<T> {
    state: LoadState<T>,
    issued: u64,
    mutating: bool,
    message: Option<String>,
    mutation_error: Option<String>,
}

impl<T> Default for Mirror<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mirror<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LoadState::Idle,
            issued: 0,
            mutating: false,
            message: None,
            mutation_error: None,
        }
    }

    /// Issue a new fetch and enter `Loading`.
    pub fn begin_fetch(&mut self) -> Generation {
        self.issued += 1;
        self.state = LoadState::Loading;
        Generation(self.issued)
    }

    /// Whether `generation` is the latest issued fetch.
    #[must_use]
    pub const fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.issued
    }

    /// Apply a fetch result if it belongs to the latest fetch.
    ///
    /// Returns `false` (and changes nothing) for a superseded fetch.
    pub fn finish(
        &mut self,
        generation: Generation,
        result: Result<ApiResponse<T>, ClientError>,
    ) -> bool {
        self.settle(generation, result).unwrap_or(true)
    }

    /// Like [`Self::finish`], but hands a current fetch's error back to the
    /// caller after recording it.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when `generation` is current.
    pub fn settle(
        &mut self,
        generation: Generation,
        result: Result<ApiResponse<T>, ClientError>,
    ) -> Result<bool, MirrorError> {
        if !self.is_current(generation) {
            tracing::debug!(
                stale = generation.0,
                latest = self.issued,
                "discarding superseded fetch"
            );
            return Ok(false);
        }
        match result {
            Ok(response) => {
                self.message = Some(response.message);
                self.state = LoadState::Loaded(response.data);
                Ok(true)
            }
            Err(err) => {
                self.message = None;
                self.state = LoadState::Failed(err.message());
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState<T> {
        &self.state
    }

    /// Loaded data, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match &self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn data_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Replace the data outright with a server-confirmed value.
    pub(crate) fn set_loaded(&mut self, data: T) {
        self.state = LoadState::Loaded(data);
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Whether a mutation is in flight; the triggering control should be
    /// disabled while this holds.
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        self.mutating
    }

    /// Server message of the last successful fetch or mutation.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Error to show: a failed fetch, else a failed mutation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => self.mutation_error.as_deref(),
        }
    }

    /// Enter the mutating state.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::Busy` while another mutation is in flight.
    pub fn begin_mutation(&mut self) -> Result<(), MirrorError> {
        if self.mutating {
            return Err(MirrorError::Busy);
        }
        self.mutating = true;
        self.mutation_error = None;
        Ok(())
    }

    /// Leave the mutating state, recording the message of a failure.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, wrapped.
    pub fn end_mutation<R>(
        &mut self,
        result: Result<ApiResponse<R>, ClientError>,
    ) -> Result<ApiResponse<R>, MirrorError> {
        self.mutating = false;
        match result {
            Ok(response) => {
                self.message = Some(response.message.clone());
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(error = %err, "mutation failed");
                self.mutation_error = Some(err.message());
                Err(err.into())
            }
        }
    }

    /// Record a refusal that never reached the server.
    pub(crate) fn refuse(&mut self, err: MirrorError) -> MirrorError {
        self.mutation_error = Some(err.message());
        err
    }
}
