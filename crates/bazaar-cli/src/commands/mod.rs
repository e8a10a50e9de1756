//! Subcommand implementations.

pub mod auth;
pub mod catalog;

/// Turn a library error into a CLI error, pointing at the login flow when
/// the session is gone.
pub fn explain(err: bazaar_core::Error) -> anyhow::Error {
    if err.requires_reauth() {
        anyhow::Error::new(err)
            .context("Not logged in. Run 'bazaar auth send-otp' then 'bazaar auth verify-otp'.")
    } else {
        err.into()
    }
}
