//! bazaar-file - File-backed credential store.
//!
//! Persists the credential pair as JSON so a restarted client starts out
//! logged in.

mod store;

pub use store::{FileTokenStore, StoredCredentials};
