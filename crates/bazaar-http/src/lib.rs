//! bazaar-http - Authenticated client for the bazaar storefront API
//!
//! Every request goes through [`BazaarClient`], which attaches the bearer
//! token from a [`SessionContext`] and transparently refreshes it when the
//! server rejects it. Concurrent failures share a single refresh exchange.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bazaar_core::{ApiUrl, FilterField, ListController, MemoryTokenStore};
//! use bazaar_http::{BazaarClient, CatalogFeed, SessionContext};
//!
//! # async fn example() -> Result<(), bazaar_core::Error> {
//! let session = SessionContext::init(Arc::new(MemoryTokenStore::new()))?;
//! let client = BazaarClient::new(ApiUrl::new("https://api.bazaar.example")?, session)?;
//!
//! let mut feed = CatalogFeed::new(Arc::new(client), ListController::default());
//! feed.set_filter_field(FilterField::MaxPrice(Some(500_000)));
//! feed.sync()?;
//! feed.wait_idle().await;
//!
//! for product in feed.items() {
//!     println!("{}: {}", product.id, product.title);
//! }
//! # Ok(())
//! # }
//! ```

mod catalog;
mod client;
pub mod endpoints;
mod feed;
mod refresh;
mod request;
mod session;
mod transport;

pub use client::BazaarClient;
pub use endpoints::UserProfile;
pub use feed::CatalogFeed;
pub use request::{ApiRequest, Attempt};
pub use session::{SessionContext, SessionStatus};
pub use transport::DEFAULT_TIMEOUT;
