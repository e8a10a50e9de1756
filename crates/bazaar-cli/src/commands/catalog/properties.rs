//! Properties command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bazaar_core::{ApiUrl, CatalogSource, CategoryId, PropertyKind};

use crate::commands::explain;
use crate::session;

#[derive(Args, Debug)]
pub struct PropertiesArgs {
    /// Category ID
    pub category: String,
}

pub async fn run(args: PropertiesArgs, api: ApiUrl) -> Result<()> {
    let client = session::open_client(api)?;
    let category = CategoryId::new(args.category);

    let properties = client
        .category_properties(&category)
        .await
        .map_err(explain)
        .with_context(|| format!("Failed to fetch properties of '{}'", category))?;

    if properties.is_empty() {
        eprintln!("{}", "No filterable properties.".dimmed());
        return Ok(());
    }

    for property in &properties {
        let kind = match &property.kind {
            PropertyKind::Text => "text".to_string(),
            PropertyKind::Number => "number".to_string(),
            PropertyKind::Bool => "bool".to_string(),
            PropertyKind::Date => "date".to_string(),
            PropertyKind::Select { options } => format!("one of {}", options.join(", ")),
        };
        println!("{}  {}", property.key.bold(), kind.dimmed());
    }

    Ok(())
}
