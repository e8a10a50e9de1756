//! Error types for the bazaar client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, input validation and storage errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for bazaar operations.
///
/// Callers match on the variant to tell a recoverable network failure from a
/// session that has to be re-established.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (missing session, invalid refresh token).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (non-success API responses, unexpected bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (URL, phone, filter values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Persisted credential storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if the session is gone and the user has to log in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            Error::Auth(
                AuthError::RefreshTokenInvalid
                    | AuthError::RefreshFailed { .. }
                    | AuthError::NotAuthenticated
            )
        )
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials are stored.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The OTP code or credentials were rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The refresh token itself was rejected; the session is over.
    #[error("refresh token invalid")]
    RefreshTokenInvalid,

    /// The refresh exchange failed for another reason; the session is over.
    #[error("token refresh failed: {reason}")]
    RefreshFailed { reason: String },
}

/// Protocol-level errors from API responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

/// Server message marking a rejected refresh token.
pub const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this is an authorization failure (401 or 403).
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Check if the body carries the invalid-refresh-token marker, whatever the status.
    pub fn mentions_invalid_refresh_token(&self) -> bool {
        let matches = |s: &Option<String>| {
            s.as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(INVALID_REFRESH_TOKEN))
        };
        matches(&self.message) || matches(&self.error)
    }

    /// Check if an authorization failure says the refresh token itself was rejected.
    pub fn is_invalid_refresh_token(&self) -> bool {
        self.is_auth_error() && self.mentions_invalid_refresh_token()
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid phone number.
    #[error("invalid phone number '{value}': {reason}")]
    Phone { value: String, reason: String },

    /// Invalid price range.
    #[error("invalid price range: {reason}")]
    PriceRange { reason: String },

    /// Invalid property filter.
    #[error("invalid property '{key}': {reason}")]
    Property { key: String, reason: String },

    /// Query key could not be parsed.
    #[error("invalid query key '{value}': {reason}")]
    QueryKey { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Credential storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be (de)serialized.
    #[error("corrupt credential data: {0}")]
    Format(#[from] serde_json::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(StorageError::Io(err))
    }
}
