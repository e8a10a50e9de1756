//! bazaar-core - Core types and state machines for the bazaar storefront client.
//!
//! Transport-free: the HTTP side lives in `bazaar-http`, persistence in
//! `bazaar-file`.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod listing;
pub mod tokens;
pub mod traits;
pub mod types;

pub use catalog::{CategoryId, Product, ProductPage};
pub use error::Error;
pub use filter::{
    FilterDescriptor, FilterField, PropertyDefinition, PropertyFilter, PropertyKind,
    PropertyValue, QueryKey, Sort, SortDirection, SortField,
};
pub use listing::{Applied, FetchRequest, ListController, ListState, PageResponse};
pub use tokens::{AccessToken, CredentialPair, RefreshToken};
pub use traits::{CatalogSource, MemoryTokenStore, TokenStore};
pub use types::{ApiUrl, PhoneNumber};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
