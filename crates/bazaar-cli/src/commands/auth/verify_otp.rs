//! Verify-otp command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bazaar_core::ApiUrl;

use crate::output;
use crate::session::{self, storage};

#[derive(Args, Debug)]
pub struct VerifyOtpArgs {
    /// Phone number the code was sent to
    #[arg(long)]
    pub phone: String,

    /// Code received by SMS
    #[arg(long)]
    pub code: String,
}

pub async fn run(args: VerifyOtpArgs, api: ApiUrl) -> Result<()> {
    let phone = super::parse_phone(&args.phone)?;
    let client = session::open_client(api)?;

    eprintln!("{}", "Logging in...".dimmed());
    client
        .verify_otp(&phone, args.code.trim())
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Phone", phone.as_str());
    output::field("API", client.api().as_str());
    output::field("Session", &storage::session_path()?.display().to_string());

    Ok(())
}
