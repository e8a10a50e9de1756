//! Catalog endpoints over the authenticated client.

use async_trait::async_trait;
use tracing::{debug, instrument};

use bazaar_core::filter::{ProductQuery, PropertyDefinition};
use bazaar_core::{CatalogSource, CategoryId, Product, ProductPage, Result};

use crate::client::BazaarClient;
use crate::endpoints::{PRODUCTS_FILTER, category_properties, product};
use crate::request::ApiRequest;

#[async_trait]
impl CatalogSource for BazaarClient {
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    async fn fetch_page(&self, query: &ProductQuery) -> Result<ProductPage> {
        debug!("Fetching product page");
        let request = ApiRequest::post(PRODUCTS_FILTER).json(query)?;
        let page: ProductPage = self.send(&request).await?;
        debug!(items = page.items.len(), total = ?page.total, "Fetched product page");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn product(&self, id: u64) -> Result<Product> {
        self.send(&ApiRequest::get(product(id))).await
    }

    #[instrument(skip(self), fields(%category))]
    async fn category_properties(&self, category: &CategoryId) -> Result<Vec<PropertyDefinition>> {
        self.send(&ApiRequest::get(category_properties(category.as_str())))
            .await
    }
}
