//! Authentication payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Session-bearing payload returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role_id: Role,
    /// Display name; only demo logins fill this in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub shipping_address: String,
}

/// Payload returned by a successful registration.
///
/// Registration may or may not log the user in: a token is present only when
/// the backend issues one straight away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_decodes_role() {
        let json = r#"{
            "token": "abc",
            "userId": 9,
            "username": "staff01",
            "email": "staff@gearhub.test",
            "roleId": 2
        }"#;
        let login: LoginResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(login.role_id, Role::Moderator);
        assert_eq!(login.user_id, UserId::new(9));
        assert!(login.name.is_none());
    }

    #[test]
    fn test_register_request_uses_camel_case() {
        let request = RegisterRequest {
            confirm_password: "secret1".to_string(),
            ..RegisterRequest::default()
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["confirmPassword"], "secret1");
        assert!(value.get("shippingAddress").is_some());
    }
}
