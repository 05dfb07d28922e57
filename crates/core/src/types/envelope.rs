//! The `{success, message, data}` wrapper every API response uses.

use serde::{Deserialize, Serialize};

/// Decoded API response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the backend reports success.
    pub success: bool,
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
    /// Payload.
    pub data: T,
    /// Machine-readable error code (error responses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Underlying error detail (error responses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            code: None,
            origin_message: None,
        }
    }

    /// Transform the payload, keeping the envelope metadata.
    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            message: self.message,
            data: f(self.data),
            code: self.code,
            origin_message: self.origin_message,
        }
    }

    /// Drop the envelope and keep the payload.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }
}
