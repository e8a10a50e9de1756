//! Authenticated API client with transparent token refresh.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use bazaar_core::error::{AuthError, Error, ProtocolError, TransportError};
use bazaar_core::{AccessToken, ApiUrl, PhoneNumber, Result};

use crate::endpoints::{
    ME, REFRESH, REGISTER, RefreshRequest, RefreshResponse, RegisterRequest, SEND_OTP,
    SendOtpRequest, TokenResponse, UserProfile, VERIFY_OTP, VerifyOtpRequest,
};
use crate::refresh::{RefreshRejected, Role};
use crate::request::{ApiRequest, Attempt};
use crate::session::SessionContext;
use crate::transport::{DEFAULT_TIMEOUT, HttpTransport};

/// Client for the storefront API.
///
/// Attaches the session's access token to every request except credential
/// endpoints. When a request is rejected with 401/403 the client refreshes
/// the token once, shared with every other request failing at the same time,
/// and retries the request once with the new token.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use bazaar_core::{ApiUrl, MemoryTokenStore, PhoneNumber};
/// use bazaar_http::{BazaarClient, SessionContext};
///
/// # async fn example() -> Result<(), bazaar_core::Error> {
/// let session = SessionContext::init(Arc::new(MemoryTokenStore::new()))?;
/// let client = BazaarClient::new(ApiUrl::new("https://api.bazaar.example")?, session)?;
///
/// let phone = PhoneNumber::new("+998901234567")?;
/// client.send_otp(&phone).await?;
/// client.verify_otp(&phone, "123456").await?;
///
/// let me = client.me().await?;
/// println!("Logged in as {}", me.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BazaarClient {
    transport: HttpTransport,
    session: SessionContext,
}

impl BazaarClient {
    pub fn new(api: ApiUrl, session: SessionContext) -> Result<Self> {
        Self::with_timeout(api, session, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api: ApiUrl, session: SessionContext, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(api, timeout)?,
            session,
        })
    }

    pub fn api(&self) -> &ApiUrl {
        self.transport.api()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Transport and protocol errors propagate unchanged, except 401/403 on
    /// authenticated requests, which go through one refresh-and-retry cycle.
    /// If the refresh itself fails the session is cleared and an
    /// [`AuthError`] is returned.
    pub async fn send<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R> {
        let value = self.send_json(request).await?;
        serde_json::from_value(value).map_err(|e| {
            Error::Transport(TransportError::Decode {
                message: e.to_string(),
            })
        })
    }

    /// Like [`send`](Self::send) but returns the raw JSON body.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send_json(&self, request: &ApiRequest) -> Result<serde_json::Value> {
        let authed = request.requires_auth();
        let mut token = if authed {
            self.session.access_token()
        } else {
            None
        };
        let mut attempt = Attempt::FIRST;

        loop {
            match self.transport.execute(request, token.as_ref()).await {
                Err(Error::Protocol(err)) if authed && err.is_auth_error() => {
                    token = Some(self.recover(err, attempt, token).await?);
                    attempt = attempt.next();
                    debug!(?attempt, "retrying with refreshed token");
                }
                result => return result,
            }
        }
    }

    /// Decide how to get past an authorization failure.
    async fn recover(
        &self,
        err: ProtocolError,
        attempt: Attempt,
        used: Option<AccessToken>,
    ) -> Result<AccessToken> {
        if err.is_invalid_refresh_token() {
            warn!("refresh token rejected");
            self.session.expire();
            return Err(AuthError::RefreshTokenInvalid.into());
        }

        if attempt.is_retry() {
            debug!(status = err.status, "still unauthorized after refresh");
            return Err(err.into());
        }

        // A refresh finished between sending and failing: just use its token.
        if let Some(current) = self.session.access_token()
            && used.as_ref() != Some(&current)
        {
            debug!("token already refreshed by another request");
            return Ok(current);
        }

        if used.is_none() && self.session.refresh_token().is_none() {
            debug!(status = err.status, "unauthorized without a session");
            return Err(AuthError::NotAuthenticated.into());
        }

        self.refreshed_token().await
    }

    /// Obtain a new access token, running the exchange only if no other
    /// request already is.
    async fn refreshed_token(&self) -> Result<AccessToken> {
        match self.session.refresh_queue().join() {
            Role::Waiter(rx) => {
                debug!("waiting for in-flight refresh");
                match rx.await {
                    Ok(outcome) => outcome.map_err(Error::from),
                    Err(_) => Err(AuthError::RefreshFailed {
                        reason: "refresh abandoned".to_string(),
                    }
                    .into()),
                }
            }
            Role::Leader(guard) => match self.exchange().await {
                Ok(token) => {
                    guard.settle(Ok(token.clone()));
                    Ok(token)
                }
                Err(err) => {
                    self.session.expire();
                    let rejected = match &err {
                        Error::Auth(AuthError::RefreshTokenInvalid) => RefreshRejected::InvalidToken,
                        other => RefreshRejected::Failed(other.to_string()),
                    };
                    guard.settle(Err(rejected.clone()));
                    Err(rejected.into())
                }
            },
        }
    }

    /// The refresh exchange itself.
    #[instrument(skip(self))]
    async fn exchange(&self) -> Result<AccessToken> {
        info!("Refreshing session");

        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(AuthError::NotAuthenticated)?;

        let request = ApiRequest::post(REFRESH).json(&RefreshRequest {
            refresh_token: refresh_token.as_str(),
        })?;

        let value = match self.transport.execute(&request, None).await {
            Ok(value) => value,
            Err(Error::Protocol(err)) if err.mentions_invalid_refresh_token() => {
                return Err(AuthError::RefreshTokenInvalid.into());
            }
            Err(err) => return Err(err),
        };

        let response: RefreshResponse = serde_json::from_value(value).map_err(|e| {
            Error::Transport(TransportError::Decode {
                message: e.to_string(),
            })
        })?;

        let rotated = response.refresh_token.is_some();
        self.session
            .apply_refresh(response.access_token.clone(), response.refresh_token)?;

        debug!(rotated, "Session refreshed successfully");
        Ok(response.access_token)
    }

    /// Refresh the session now, sharing any exchange already in flight.
    ///
    /// # Errors
    ///
    /// Returns an error, and clears the session, if the exchange fails.
    pub async fn refresh(&self) -> Result<()> {
        self.refreshed_token().await.map(|_| ())
    }

    // ========================================================================
    // Auth Operations
    // ========================================================================

    /// Ask the API to text an OTP code to `phone`.
    #[instrument(skip(self, phone), fields(%phone))]
    pub async fn send_otp(&self, phone: &PhoneNumber) -> Result<()> {
        debug!("Requesting OTP");
        let request = ApiRequest::post(SEND_OTP).json(&SendOtpRequest {
            phone: phone.as_str(),
        })?;
        self.send_json(&request).await.map(|_| ())
    }

    /// Exchange an OTP code for credentials and start the session.
    #[instrument(skip(self, phone, code), fields(%phone))]
    pub async fn verify_otp(&self, phone: &PhoneNumber, code: &str) -> Result<()> {
        let request = ApiRequest::post(VERIFY_OTP).json(&VerifyOtpRequest {
            phone: phone.as_str(),
            code,
        })?;
        let response: TokenResponse = self.send(&request).await.map_err(reject_credentials)?;
        self.session.login(response.into())
    }

    /// Create an account and start the session.
    #[instrument(skip(self, phone, code), fields(%phone))]
    pub async fn register(&self, phone: &PhoneNumber, name: &str, code: &str) -> Result<()> {
        let request = ApiRequest::post(REGISTER).json(&RegisterRequest {
            phone: phone.as_str(),
            name,
            code,
        })?;
        let response: TokenResponse = self.send(&request).await.map_err(reject_credentials)?;
        self.session.login(response.into())
    }

    /// The logged-in user's profile.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile> {
        if !self.session.is_authenticated() {
            return Err(AuthError::NotAuthenticated.into());
        }
        self.send(&ApiRequest::get(ME)).await
    }

    /// End the session and forget the stored credentials.
    pub fn logout(&self) -> Result<()> {
        self.session.logout()
    }
}

/// Map a rejected OTP/registration to `InvalidCredentials`.
fn reject_credentials(err: Error) -> Error {
    match err {
        Error::Protocol(ref p) if p.is_auth_error() => AuthError::InvalidCredentials.into(),
        other => other,
    }
}
