//! Catalog subcommand implementations.

mod browse;
mod product;
mod properties;

use anyhow::Result;
use clap::{Args, Subcommand};

use bazaar_core::ApiUrl;

#[derive(Args, Debug)]
pub struct CatalogCommand {
    #[command(subcommand)]
    pub command: CatalogSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CatalogSubcommand {
    /// List products matching filters, page by page
    Browse(browse::BrowseArgs),

    /// Fetch a single product
    Product(product::ProductArgs),

    /// List the filterable properties of a category
    Properties(properties::PropertiesArgs),
}

pub async fn handle(cmd: CatalogCommand, api: ApiUrl) -> Result<()> {
    match cmd.command {
        CatalogSubcommand::Browse(args) => browse::run(args, api).await,
        CatalogSubcommand::Product(args) => product::run(args, api).await,
        CatalogSubcommand::Properties(args) => properties::run(args, api).await,
    }
}
