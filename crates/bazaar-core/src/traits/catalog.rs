//! Catalog source trait.

use async_trait::async_trait;

use crate::Result;
use crate::catalog::{CategoryId, Product, ProductPage};
use crate::filter::{ProductQuery, PropertyDefinition};

/// Something that can answer catalog queries.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of products matching a query.
    async fn fetch_page(&self, query: &ProductQuery) -> Result<ProductPage>;

    /// Fetch a single product.
    async fn product(&self, id: u64) -> Result<Product>;

    /// Properties that products in a category can be filtered by.
    async fn category_properties(&self, category: &CategoryId) -> Result<Vec<PropertyDefinition>>;
}
