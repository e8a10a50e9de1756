//! Send-otp command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bazaar_core::ApiUrl;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct SendOtpArgs {
    /// Phone number to text the code to
    #[arg(long)]
    pub phone: String,
}

pub async fn run(args: SendOtpArgs, api: ApiUrl) -> Result<()> {
    let phone = super::parse_phone(&args.phone)?;
    let client = session::open_client(api)?;

    eprintln!("{}", "Requesting code...".dimmed());
    client
        .send_otp(&phone)
        .await
        .context("Failed to send code")?;

    output::success(&format!("Code sent to {}", phone));
    Ok(())
}
