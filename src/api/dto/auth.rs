//! DTOs for signup, login and session endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::AuthSession;

/// Credentials for signup and login.
///
/// Missing fields deserialize as empty strings and are rejected by the service.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub password: String,
}

/// Outcome of signup or login.
///
/// Failures use the same shape with `success: false`; `token` and `user_id`
/// are then omitted.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AuthResponse {
    pub fn new(session: AuthSession, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            token: Some(session.token),
            user_id: Some(session.user_id),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            token: None,
            user_id: None,
        }
    }
}

/// The account behind the presented bearer token.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_omits_session_fields() {
        let body = serde_json::to_value(AuthResponse::failure("User ID already exists")).unwrap();

        assert_eq!(
            body,
            json!({ "success": false, "message": "User ID already exists" })
        );
    }
}
