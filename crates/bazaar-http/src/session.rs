//! Session context: the credential pair and its lifecycle.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use bazaar_core::{AccessToken, CredentialPair, RefreshToken, Result, TokenStore};

use crate::refresh::RefreshQueue;

/// Authentication state as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No credentials.
    Anonymous,
    /// Credentials present.
    Authenticated,
    /// The session ended involuntarily; send the user to the login screen.
    ReauthRequired,
}

/// Holds the credential pair for one user session.
///
/// Cheap to clone (internal `Arc`); clones share the same credentials and the
/// same refresh queue. Passed explicitly to whatever needs it.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn TokenStore>,
    credentials: RwLock<Option<CredentialPair>>,
    refresh: RefreshQueue,
    status: watch::Sender<SessionStatus>,
}

impl SessionContext {
    /// Seed the session from the persisted store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn init(store: Arc<dyn TokenStore>) -> Result<Self> {
        let credentials = store.load()?;
        let status = if credentials.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        };
        debug!(?status, "session initialized from store");

        let (status, _) = watch::channel(status);
        Ok(Self {
            inner: Arc::new(SessionInner {
                store,
                credentials: RwLock::new(credentials),
                refresh: RefreshQueue::default(),
                status,
            }),
        })
    }

    /// Install a freshly issued credential pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair cannot be persisted.
    pub fn login(&self, credentials: CredentialPair) -> Result<()> {
        self.inner.store.save(&credentials)?;
        *self.write() = Some(credentials);
        self.inner.status.send_replace(SessionStatus::Authenticated);
        info!("Session started");
        Ok(())
    }

    /// End the session at the user's request.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared. In-memory credentials
    /// are dropped regardless.
    pub fn logout(&self) -> Result<()> {
        *self.write() = None;
        self.inner.status.send_replace(SessionStatus::Anonymous);
        info!("Session ended");
        self.inner.store.clear()
    }

    /// End the session because it can no longer be refreshed.
    pub(crate) fn expire(&self) {
        *self.write() = None;
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        self.inner.status.send_replace(SessionStatus::ReauthRequired);
        warn!("Session expired, re-authentication required");
    }

    /// Store the result of a successful refresh exchange.
    pub(crate) fn apply_refresh(
        &self,
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
    ) -> Result<()> {
        let updated = {
            let mut credentials = self.write();
            match credentials.as_mut() {
                Some(pair) => {
                    pair.rotate(access_token, refresh_token);
                    pair.clone()
                }
                None => {
                    // Logged out while the exchange was running; keep it that way.
                    debug!("dropping refreshed tokens for ended session");
                    return Ok(());
                }
            }
        };
        self.inner.store.save(&updated)
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.read().as_ref().map(|c| c.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.read().as_ref().map(|c| c.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn status(&self) -> SessionStatus {
        *self.inner.status.borrow()
    }

    /// Watch status changes, e.g. to navigate to login on `ReauthRequired`.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status.subscribe()
    }

    /// True while a refresh exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    pub(crate) fn refresh_queue(&self) -> &RefreshQueue {
        &self.inner.refresh
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<CredentialPair>> {
        self.inner
            .credentials
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<CredentialPair>> {
        self.inner
            .credentials
            .write()
            .unwrap_or_else(|e| e.into_inner())
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("status", &self.status())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
