//! Outbound request description.

use reqwest::Method;
use serde::Serialize;

use bazaar_core::Result;
use bazaar_core::error::InvalidInputError;

use crate::endpoints::CREDENTIAL_ENDPOINTS;

/// An API request, independent of the credential it is sent with.
///
/// Requests are immutable; a retry re-sends the same value with a different
/// token and the next [`Attempt`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body: {}", e),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Add a query-string parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// False for credential endpoints, which must never see a stale token.
    pub fn requires_auth(&self) -> bool {
        let path = self.path.trim_end_matches('/');
        !CREDENTIAL_ENDPOINTS.contains(&path)
    }
}

/// How many times a request has been sent. Only the first attempt may
/// trigger a token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attempt(u8);

impl Attempt {
    pub const FIRST: Attempt = Attempt(0);

    pub fn next(self) -> Attempt {
        Attempt(self.0.saturating_add(1))
    }

    pub fn is_retry(self) -> bool {
        self.0 > 0
    }
}
