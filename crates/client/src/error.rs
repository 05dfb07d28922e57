//! Error taxonomy for the transport and resource client.
//!
//! Every failure that can reach a screen is normalized into [`ClientError`]
//! before it leaves this crate. Screens display [`ClientError::message`].

use thiserror::Error;

use crate::session::StorageError;

/// Characters of a non-JSON body kept for diagnostics.
pub const SNIPPET_LEN: usize = 100;

/// Default API error message when the server sends none.
pub const DEFAULT_API_MESSAGE: &str = "An error occurred";

/// Message returned when the demo login finds no match.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Errors produced by the transport and resource client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The response was not the JSON envelope we expected.
    #[error("{detail}")]
    Protocol {
        /// HTTP status of the offending response.
        status: u16,
        /// Diagnostic text, including a truncated body where relevant.
        detail: String,
    },

    /// The server answered with an error status or `success: false`.
    #[error("API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server error code, `E<status>` when absent.
        code: String,
        /// Server message.
        message: String,
        /// Underlying detail, the HTTP status text when absent.
        origin_message: String,
    },

    /// Synthetic error raised by the demo data source.
    #[error("{0}")]
    Demo(String),

    /// The request never completed (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request could not be built.
    #[error("request encoding failed: {0}")]
    Encode(String),

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Protocol error for a body that is not JSON.
    #[must_use]
    pub fn non_json(status: u16, body: &str) -> Self {
        let snippet: String = body.chars().take(SNIPPET_LEN).collect();
        Self::Protocol {
            status,
            detail: format!("Server returned non-JSON response: {snippet}"),
        }
    }

    /// Protocol error for JSON that does not match the expected shape.
    #[must_use]
    pub fn malformed(status: u16, err: &serde_json::Error) -> Self {
        Self::Protocol {
            status,
            detail: format!("Malformed response payload: {err}"),
        }
    }

    /// The demo login's rejection.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::Demo(INVALID_CREDENTIALS.to_string())
    }

    /// Text to show the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Protocol { detail, .. } => detail.clone(),
            Self::Demo(message) => message.clone(),
            Self::Network(_) | Self::Encode(_) | Self::Storage(_) => self.to_string(),
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend was unreachable or unusable.
    ///
    /// This gates the demo fallback: network failures, protocol failures and
    /// 5xx responses qualify. A 4xx answer came from a live backend and is
    /// never papered over.
    #[must_use]
    pub const fn is_backend_unavailable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Protocol { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Demo(_) | Self::Encode(_) | Self::Storage(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_keeps_first_hundred_chars() {
        let body = format!("<html>{}</html>", "x".repeat(300));
        let err = ClientError::non_json(502, &body);
        let message = err.message();
        let snippet = message
            .strip_prefix("Server returned non-JSON response: ")
            .expect("prefix");
        assert_eq!(snippet.chars().count(), SNIPPET_LEN);
        assert!(snippet.starts_with("<html>"));
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_api_message_is_server_text() {
        let err = ClientError::Api {
            status: 400,
            code: "E400".to_string(),
            message: "Quantity exceeds stock".to_string(),
            origin_message: "Bad Request".to_string(),
        };
        assert_eq!(err.message(), "Quantity exceeds stock");
        assert_eq!(
            err.to_string(),
            "API error 400 (E400): Quantity exceeds stock"
        );
        assert!(!err.is_backend_unavailable());
    }

    #[test]
    fn test_backend_unavailable_classification() {
        let server_down = ClientError::Api {
            status: 503,
            code: "E503".to_string(),
            message: DEFAULT_API_MESSAGE.to_string(),
            origin_message: "Service Unavailable".to_string(),
        };
        assert!(server_down.is_backend_unavailable());
        assert!(ClientError::non_json(200, "oops").is_backend_unavailable());
        assert!(!ClientError::invalid_credentials().is_backend_unavailable());
    }

    #[test]
    fn test_invalid_credentials_message() {
        assert_eq!(ClientError::invalid_credentials().message(), "Invalid credentials");
    }
}
