//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use bazaar_core::ApiUrl;

use crate::commands::explain;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the raw profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, api: ApiUrl) -> Result<()> {
    let client = session::open_client(api)?;
    if !client.session().is_authenticated() {
        bail!("No active session. Run 'bazaar auth verify-otp' first.");
    }

    let profile = client
        .me()
        .await
        .map_err(explain)
        .context("Failed to fetch profile")?;

    if args.json {
        return output::json_pretty(&profile);
    }

    output::field("ID", &profile.id.to_string());
    if let Some(name) = &profile.name {
        output::field("Name", name);
    }
    if let Some(phone) = &profile.phone {
        output::field("Phone", phone);
    }
    output::field("API", client.api().as_str());

    Ok(())
}
