//! Request and response bodies (camelCase on the wire).

use aviator_core::models::auth::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error envelope for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateOtpRequest {
    pub email: Option<String>,
}

/// A one-time code may arrive as a JSON string or a bare number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OtpValue {
    Text(String),
    Number(u64),
}

impl OtpValue {
    pub fn into_string(self) -> String {
        match self {
            OtpValue::Text(s) => s,
            OtpValue::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub otp: Option<OtpValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckEmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckEmailResponse {
    pub available: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfoRequest {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<Identity> for UserInfoResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            full_name: identity.full_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetRefreshTokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub store_connected: bool,
    pub version: String,
}
