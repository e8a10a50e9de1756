//! Refresh command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use bazaar_core::ApiUrl;

use crate::commands::explain;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, api: ApiUrl) -> Result<()> {
    let client = session::open_client(api)?;
    if !client.session().is_authenticated() {
        bail!("No active session. Run 'bazaar auth verify-otp' first.");
    }

    client
        .refresh()
        .await
        .map_err(explain)
        .context("Failed to refresh session")?;

    output::success("Session refreshed");
    Ok(())
}
