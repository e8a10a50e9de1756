//! Browse command implementation.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use colored::Colorize;
use tracing::debug;
use url::Url;

use bazaar_core::filter::{search_from_url, write_search_to_url};
use bazaar_core::listing::DEFAULT_PAGE_SIZE;
use bazaar_core::{
    ApiUrl, CatalogSource, CategoryId, FilterField, ListController, ListState, Sort,
};
use bazaar_http::{BazaarClient, CatalogFeed};

use crate::commands::explain;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Category to browse (all categories if omitted)
    #[arg(long)]
    pub category: Option<String>,

    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// Take the search text from a storefront URL's `q` parameter
    #[arg(long, conflicts_with = "search")]
    pub from_url: Option<Url>,

    /// Minimum price
    #[arg(long)]
    pub min_price: Option<u64>,

    /// Maximum price
    #[arg(long)]
    pub max_price: Option<u64>,

    /// Category property filter, e.g. --prop color=red (repeatable)
    #[arg(long = "prop", value_name = "KEY=VALUE", requires = "category")]
    pub props: Vec<String>,

    /// Sort order, e.g. price:asc
    #[arg(long)]
    pub sort: Option<Sort>,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Items per page
    #[arg(long, env = "BAZAAR_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Print products as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: BrowseArgs, api: ApiUrl) -> Result<()> {
    let client = Arc::new(session::open_client(api)?);
    let scope = args.category.clone().map(CategoryId::new);

    let mut feed = CatalogFeed::new(
        Arc::clone(&client),
        ListController::new(scope.clone(), args.page_size),
    );
    apply_filters(&mut feed, &client, scope.as_ref(), &args).await?;

    feed.sync().context("Invalid filters")?;
    await_page(&mut feed).await?;

    let mut loaded = 1;
    while loaded < args.pages && feed.controller().has_more() {
        feed.fetch_next_page();
        await_page(&mut feed).await?;
        loaded += 1;
    }

    if args.json {
        for product in feed.items() {
            output::json(product)?;
        }
    } else {
        print_listing(&feed);
    }

    if let Some(mut url) = args.from_url {
        write_search_to_url(&mut url, feed.controller().filters().search());
        eprintln!("{}: {}", "Share".dimmed(), url);
    }

    Ok(())
}

/// Load the descriptor from the command line, in the order a user would set it.
async fn apply_filters(
    feed: &mut CatalogFeed<BazaarClient>,
    client: &BazaarClient,
    scope: Option<&CategoryId>,
    args: &BrowseArgs,
) -> Result<()> {
    let search = match &args.from_url {
        Some(url) => search_from_url(url),
        None => args.search.clone(),
    };
    if let Some(search) = search {
        feed.set_filter_field(FilterField::Search(search));
    }

    feed.set_filter_field(FilterField::MinPrice(args.min_price));
    feed.set_filter_field(FilterField::MaxPrice(args.max_price));

    if let Some(sort) = args.sort {
        feed.set_filter_field(FilterField::SortField(sort.field));
        feed.set_filter_field(FilterField::SortDirection(sort.direction));
    }

    if args.props.is_empty() {
        return Ok(());
    }

    let category = scope.ok_or_else(|| anyhow!("--prop requires --category"))?;
    let definitions = client
        .category_properties(category)
        .await
        .map_err(explain)
        .with_context(|| format!("Failed to fetch properties of '{}'", category))?;

    for raw in &args.props {
        let (key, value) = raw
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{}'", raw))?;
        let definition = definitions
            .iter()
            .find(|d| d.key == key.trim())
            .with_context(|| format!("'{}' has no property '{}'", category, key.trim()))?;
        let filter = definition
            .parse_value(value.trim())
            .with_context(|| format!("Invalid value for '{}'", definition.key))?;
        feed.set_filter_field(FilterField::Property(filter));
    }

    Ok(())
}

/// Wait for the page in flight, failing the command if it failed.
async fn await_page(feed: &mut CatalogFeed<BazaarClient>) -> Result<()> {
    let applied = feed.wait_idle().await;
    debug!(?applied, state = ?feed.controller().state(), "page settled");

    if let ListState::Failed { page, message } = feed.controller().state() {
        bail!("Failed to load page {}: {}", page, message);
    }
    Ok(())
}

fn print_listing(feed: &CatalogFeed<BazaarClient>) {
    let controller = feed.controller();
    let pages = controller.pages();

    if pages.item_count() == 0 {
        eprintln!("{}", "No products found.".dimmed());
        return;
    }

    for product in feed.items() {
        output::product_row(product);
    }

    eprintln!();
    let shown = match pages.total() {
        Some(total) => format!("{} of {}", pages.item_count(), total),
        None => pages.item_count().to_string(),
    };
    output::field("Showing", &shown);

    let active = controller.active_filter_count();
    if active > 0 {
        output::field("Active filters", &active.to_string());
    }
    if controller.has_more() {
        output::warning("More results available, use --pages to load them");
    }
}
