//! Canonical cache identity for a scoped filter descriptor.

use std::fmt;

use url::form_urlencoded;

use crate::catalog::CategoryId;
use crate::error::{Error, InvalidInputError};

use super::descriptor::{FilterDescriptor, FilterField, Sort};
use super::property::{PropertyFilter, PropertyValue};

const CATEGORY: &str = "category";
const SEARCH: &str = "q";
const MIN_PRICE: &str = "minPrice";
const MAX_PRICE: &str = "maxPrice";
const SORT: &str = "sort";
const PROPERTY_PREFIX: &str = "p.";

/// The identity of a list query.
///
/// A form-encoded string of sorted `name=value` pairs covering the scope and
/// every effective filter. The page number is never part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    /// Compute the key for a scope and descriptor.
    pub fn new(scope: Option<&CategoryId>, filters: &FilterDescriptor) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();

        if let Some(scope) = scope {
            pairs.push((CATEGORY.to_string(), scope.as_str().to_string()));
        }
        if let Some(search) = filters.search() {
            pairs.push((SEARCH.to_string(), search.to_string()));
        }
        if let Some(min) = filters.min_price() {
            pairs.push((MIN_PRICE.to_string(), min.to_string()));
        }
        if let Some(max) = filters.max_price() {
            pairs.push((MAX_PRICE.to_string(), max.to_string()));
        }
        pairs.push((SORT.to_string(), filters.sort().to_string()));
        for (key, value) in filters.properties() {
            pairs.push((format!("{}{}", PROPERTY_PREFIX, key), value.encode_tagged()));
        }

        pairs.sort();

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &pairs {
            serializer.append_pair(name, value);
        }
        Self(serializer.finish())
    }

    /// Wrap a previously serialized key.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the scope and descriptor this key was computed from.
    ///
    /// # Errors
    ///
    /// Returns an error if the key contains unknown names or malformed values.
    pub fn parse(&self) -> Result<(Option<CategoryId>, FilterDescriptor), Error> {
        let invalid = |reason: String| {
            Error::from(InvalidInputError::QueryKey {
                value: self.0.clone(),
                reason,
            })
        };
        let price = |raw: &str| {
            raw.parse::<u64>()
                .map_err(|_| invalid(format!("'{}' is not a price", raw)))
        };

        let mut scope = None;
        let mut filters = FilterDescriptor::new();

        for (name, value) in form_urlencoded::parse(self.0.as_bytes()) {
            match name.as_ref() {
                CATEGORY => scope = Some(CategoryId::new(value.into_owned())),
                SEARCH => filters.set(FilterField::Search(value.into_owned())),
                MIN_PRICE => filters.set(FilterField::MinPrice(Some(price(&value)?))),
                MAX_PRICE => filters.set(FilterField::MaxPrice(Some(price(&value)?))),
                SORT => {
                    let sort: Sort = value.parse()?;
                    filters.set(FilterField::SortField(sort.field));
                    filters.set(FilterField::SortDirection(sort.direction));
                }
                other => {
                    let key = other
                        .strip_prefix(PROPERTY_PREFIX)
                        .ok_or_else(|| invalid(format!("unknown name '{}'", other)))?;
                    let value = PropertyValue::decode_tagged(key, &value)?;
                    filters.set(FilterField::Property(PropertyFilter::new(key, value)?));
                }
            }
        }

        Ok((scope, filters))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
