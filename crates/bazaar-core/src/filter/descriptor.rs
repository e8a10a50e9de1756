//! The filter descriptor edited by catalog filter widgets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};

use super::property::{PropertyFilter, PropertyValue};

/// Field the listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Price,
    Title,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Price => "price",
            SortField::Title => "title",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort order: newest first unless the user picks something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn is_default(&self) -> bool {
        *self == Sort::default()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.as_str(), self.direction.as_str())
    }
}

impl FromStr for Sort {
    type Err = Error;

    /// Parses `field:direction`, e.g. `price:asc`. The direction defaults to `desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            Error::from(InvalidInputError::Other {
                message: format!("invalid sort '{}', expected e.g. 'price:asc'", s),
            })
        };

        let (field, direction) = s.split_once(':').unwrap_or((s, "desc"));
        let field = match field {
            "createdAt" | "created_at" | "date" => SortField::CreatedAt,
            "price" => SortField::Price,
            "title" => SortField::Title,
            _ => return Err(invalid()),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        Ok(Sort::new(field, direction))
    }
}

/// A single filter edit, as produced by one widget.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterField {
    Search(String),
    MinPrice(Option<u64>),
    MaxPrice(Option<u64>),
    SortField(SortField),
    SortDirection(SortDirection),
    Property(PropertyFilter),
    RemoveProperty(String),
}

/// The user's current filter selection.
///
/// Properties are kept in a sorted map, so two descriptors holding the same
/// selections are equal whatever order they were edited in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterDescriptor {
    search: String,
    min_price: Option<u64>,
    max_price: Option<u64>,
    sort: Sort,
    properties: BTreeMap<String, PropertyValue>,
}

impl FilterDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one filter edit. Does not validate cross-field constraints;
    /// see [`validate`](Self::validate).
    pub fn set(&mut self, field: FilterField) {
        match field {
            FilterField::Search(text) => self.search = text.trim().to_string(),
            FilterField::MinPrice(price) => self.min_price = price,
            FilterField::MaxPrice(price) => self.max_price = price,
            FilterField::SortField(field) => self.sort.field = field,
            FilterField::SortDirection(direction) => self.sort.direction = direction,
            FilterField::Property(filter) => {
                let (key, value) = filter.into_parts();
                self.properties.insert(key, value);
            }
            FilterField::RemoveProperty(key) => {
                self.properties.remove(&key);
            }
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, field: FilterField) -> Self {
        self.set(field);
        self
    }

    /// Reset everything to defaults.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Reset for a new category scope.
    ///
    /// Search text survives the scope change; everything else is category
    /// specific and goes back to defaults.
    pub fn reset_for_scope_change(&mut self) {
        let search = std::mem::take(&mut self.search);
        self.clear();
        self.search = search;
    }

    pub fn search(&self) -> Option<&str> {
        (!self.search.is_empty()).then_some(self.search.as_str())
    }

    pub fn min_price(&self) -> Option<u64> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<u64> {
        self.max_price
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn has_price_range(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Number of active filters, for the filter badge.
    ///
    /// Each property counts once, a price range (either bound) counts once and
    /// a non-default sort counts once. Search text is not counted.
    pub fn active_count(&self) -> usize {
        self.properties.len()
            + usize::from(self.has_price_range())
            + usize::from(!self.sort.is_default())
    }

    /// Check cross-field constraints before the descriptor is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the minimum price exceeds the maximum price.
    pub fn validate(&self) -> Result<(), Error> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(InvalidInputError::PriceRange {
                reason: format!("minimum {} is above maximum {}", min, max),
            }
            .into());
        }
        Ok(())
    }
}
