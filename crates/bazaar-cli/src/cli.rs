//! CLI argument definitions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bazaar_core::ApiUrl;

use crate::commands::auth::AuthCommand;
use crate::commands::catalog::CatalogCommand;

/// Browse the bazaar storefront from the terminal.
#[derive(Parser, Debug)]
#[command(name = "bazaar")]
#[command(author, version = env!("BAZAAR_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(
        long,
        global = true,
        env = "BAZAAR_API",
        default_value = "https://api.bazaar.market"
    )]
    pub api: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn api(&self) -> Result<ApiUrl> {
        ApiUrl::new(&self.api).with_context(|| format!("Invalid API URL '{}'", self.api))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and manage the stored session
    Auth(AuthCommand),

    /// Browse products
    Catalog(CatalogCommand),
}
