//! Product command implementation.

use anyhow::{Context, Result};
use clap::Args;

use bazaar_core::{ApiUrl, CatalogSource};

use crate::commands::explain;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ProductArgs {
    /// Product ID
    pub id: u64,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ProductArgs, api: ApiUrl) -> Result<()> {
    let client = session::open_client(api)?;

    let product = client
        .product(args.id)
        .await
        .map_err(explain)
        .with_context(|| format!("Failed to fetch product {}", args.id))?;

    if args.pretty {
        output::json_pretty(&product)
    } else {
        output::json(&product)
    }
}
