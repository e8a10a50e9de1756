//! HTTP transport: one request in, one decoded response out.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, instrument, trace};

use bazaar_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use bazaar_core::{AccessToken, ApiUrl, Result};

use crate::endpoints::ErrorResponse;
use crate::request::ApiRequest;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// Sends [`ApiRequest`]s to the API without any retry logic.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    api: ApiUrl,
}

impl HttpTransport {
    pub(crate) fn new(api: ApiUrl, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bazaar/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(map_reqwest)?;

        Ok(Self { client, api })
    }

    pub(crate) fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Send a request, attaching `token` as a bearer credential if given.
    ///
    /// Returns the JSON body, or `Null` for an empty body.
    #[instrument(skip(self, request, token), fields(method = %request.method(), path = request.path()))]
    pub(crate) async fn execute(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<serde_json::Value> {
        let url = self.api.endpoint(request.path());
        debug!(authed = token.is_some(), "API request");

        let mut builder = self.client.request(request.method().clone(), &url);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(body) = request.body() {
            trace!(%body, "request body");
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer(token)?);
        }

        let response = builder.send().await.map_err(map_reqwest)?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        trace!(status = %status, "API response");

        if !status.is_success() {
            return Err(Error::Protocol(self.parse_error_response(response).await));
        }

        let bytes = response.bytes().await.map_err(map_reqwest)?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::Transport(TransportError::Decode {
                message: e.to_string(),
            })
        })
    }

    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(
                status,
                body.error,
                body.message.map(|m| m.into_string()),
            ),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}

fn bearer(token: &AccessToken) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(|_| {
        InvalidInputError::Other {
            message: "access token contains invalid header characters".to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}
