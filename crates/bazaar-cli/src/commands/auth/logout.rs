//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bazaar_core::ApiUrl;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs, api: ApiUrl) -> Result<()> {
    let client = session::open_client(api)?;
    if !client.session().is_authenticated() {
        eprintln!("{}", "No active session.".dimmed());
        return Ok(());
    }

    client.logout().context("Failed to remove session")?;
    output::success("Logged out");
    Ok(())
}
