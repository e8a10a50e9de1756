//! Catalog types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a catalog category (the list scope).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server-assigned identifier.
    pub id: u64,

    /// Listing title.
    pub title: String,

    /// Price in the store currency's smallest unit.
    pub price: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    /// Cover image URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Fields this client does not interpret (description, seller, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page from the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage<T = Product> {
    /// Items in server order.
    pub items: Vec<T>,

    /// Total number of items matching the query, if the server reported it.
    #[serde(default)]
    pub total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_keeps_unknown_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "title": "Bicycle",
            "price": 250000,
            "categoryId": "sport",
            "description": "barely used"
        }))
        .unwrap();

        assert_eq!(product.category_id, Some(CategoryId::new("sport")));
        assert_eq!(product.extra["description"], "barely used");
    }

    #[test]
    fn page_without_total() {
        let page: ProductPage = serde_json::from_value(json!({ "items": [] })).unwrap();
        assert!(page.total.is_none());
    }
}
