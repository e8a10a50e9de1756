//! Catalog filter model.
//!
//! A [`FilterDescriptor`] holds what the user selected, a [`QueryKey`] is its
//! canonical identity, and a [`ProductQuery`] is what goes on the wire.

mod descriptor;
mod property;
mod query;
mod query_key;
mod url_sync;

pub use descriptor::{FilterDescriptor, FilterField, Sort, SortDirection, SortField};
pub use property::{PropertyDefinition, PropertyFilter, PropertyKind, PropertyValue};
pub use query::{ProductQuery, PropertyParam};
pub use query_key::QueryKey;
pub use url_sync::{SEARCH_PARAM, search_from_url, write_search_to_url};
