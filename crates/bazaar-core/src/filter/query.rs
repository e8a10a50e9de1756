//! Request body for the product listing endpoint.

use serde::Serialize;

use crate::catalog::CategoryId;

use super::descriptor::{FilterDescriptor, SortDirection, SortField};

/// One `{key, value}` entry of the `properties` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyParam {
    pub key: String,
    pub value: serde_json::Value,
}

/// Body of `POST /products/filter`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    pub properties: Vec<PropertyParam>,
    pub sort_by: SortField,
    pub sort_order: SortDirection,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl ProductQuery {
    pub fn new(
        scope: Option<&CategoryId>,
        filters: &FilterDescriptor,
        page: u32,
        limit: u32,
    ) -> Self {
        let sort = filters.sort();
        Self {
            title: filters.search().map(str::to_string),
            category_id: scope.cloned(),
            min_price: filters.min_price(),
            max_price: filters.max_price(),
            properties: filters
                .properties()
                .map(|(key, value)| PropertyParam {
                    key: key.to_string(),
                    value: value.to_json(),
                })
                .collect(),
            sort_by: sort.field,
            sort_order: sort.direction,
            page,
            limit,
        }
    }
}
