//! Persisted credential storage.

use std::sync::RwLock;

use crate::{CredentialPair, Result};

/// Key-value persistence for the credential pair, read at start-up to decide
/// whether the user is logged in.
pub trait TokenStore: Send + Sync {
    /// Load the stored pair, if any.
    fn load(&self) -> Result<Option<CredentialPair>>;

    /// Replace the stored pair.
    fn save(&self, credentials: &CredentialPair) -> Result<()>;

    /// Remove any stored pair. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credentials: RwLock<Option<CredentialPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding a pair.
    pub fn with_credentials(credentials: CredentialPair) -> Self {
        Self {
            credentials: RwLock::new(Some(credentials)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<CredentialPair>> {
        Ok(self
            .credentials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save(&self, credentials: &CredentialPair) -> Result<()> {
        *self.credentials.write().unwrap_or_else(|e| e.into_inner()) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.credentials.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        let pair = CredentialPair::new("a", "r");
        store.save(&pair).unwrap();
        assert_eq!(store.load().unwrap(), Some(pair));

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
