//! The CLI's persisted login session.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};

use bazaar_core::ApiUrl;
use bazaar_http::{BazaarClient, SessionContext};

/// Build a client whose session is seeded from, and saved to, the session file.
pub fn open_client(api: ApiUrl) -> Result<BazaarClient> {
    let store = storage::token_store()?;
    let session = SessionContext::init(Arc::new(store)).context("Failed to load session")?;
    BazaarClient::new(api, session).context("Failed to create API client")
}
