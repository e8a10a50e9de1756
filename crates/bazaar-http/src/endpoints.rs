//! API endpoint paths and request/response types.

use serde::{Deserialize, Serialize};

use bazaar_core::{AccessToken, CredentialPair, RefreshToken};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Request an OTP code by SMS.
pub const SEND_OTP: &str = "/auth/otp/send";

/// Exchange an OTP code for a credential pair.
pub const VERIFY_OTP: &str = "/auth/otp/verify";

/// Create an account and receive a credential pair.
pub const REGISTER: &str = "/auth/register";

/// Exchange a refresh token for a new access token.
pub const REFRESH: &str = "/auth/refresh";

/// Current user profile.
pub const ME: &str = "/users/me";

/// Filtered product listing.
pub const PRODUCTS_FILTER: &str = "/products/filter";

/// Endpoints that hand out credentials. Requests to these never carry a
/// bearer token and never trigger a refresh.
pub const CREDENTIAL_ENDPOINTS: &[&str] = &[SEND_OTP, VERIFY_OTP, REGISTER, REFRESH];

/// Path of a single product.
pub fn product(id: u64) -> String {
    format!("/products/{}", id)
}

/// Path of a category's filterable properties.
pub fn category_properties(category: &str) -> String {
    format!("/categories/{}/properties", category)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SendOtpRequest<'a> {
    pub phone: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub phone: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub phone: &'a str,
    pub name: &'a str,
    pub code: &'a str,
}

/// Response carrying a full credential pair (OTP verify, register).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenResponse> for CredentialPair {
    fn from(response: TokenResponse) -> Self {
        CredentialPair::new(response.access_token, response.refresh_token)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from the refresh exchange. The refresh token is only present
/// when the server rotated it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
}

/// The logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<MessageField>,
}

/// Some endpoints return validation errors as a list of messages.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageField {
    One(String),
    Many(Vec<String>),
}

impl MessageField {
    pub fn into_string(self) -> String {
        match self {
            MessageField::One(message) => message,
            MessageField::Many(messages) => messages.join("; "),
        }
    }
}
