//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use bazaar_core::ApiUrl;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Phone number the code was sent to
    #[arg(long)]
    pub phone: String,

    /// Display name for the new account
    #[arg(long)]
    pub name: String,

    /// Code received by SMS
    #[arg(long)]
    pub code: String,
}

pub async fn run(args: RegisterArgs, api: ApiUrl) -> Result<()> {
    let phone = super::parse_phone(&args.phone)?;
    let client = session::open_client(api)?;

    client
        .register(&phone, args.name.trim(), args.code.trim())
        .await
        .context("Failed to register")?;

    output::success(&format!("Account created for {}", args.name.trim()));
    Ok(())
}
