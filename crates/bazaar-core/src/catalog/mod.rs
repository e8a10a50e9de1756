//! Catalog data types.
//!
//! This module defines the products and pages returned by the listing
//! endpoint. Fetching is done through a [`CatalogSource`](crate::CatalogSource).

mod types;

pub use types::{CategoryId, Product, ProductPage};
