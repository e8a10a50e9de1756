//! Category-specific property filters.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};

/// The type of a category property, as declared by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropertyKind {
    Text,
    Number,
    Bool,
    Select { options: Vec<String> },
    Date,
}

/// A property that products in a category can be filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub key: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Select(String),
    Date(NaiveDate),
}

impl PropertyValue {
    /// JSON form sent to the listing endpoint.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::Text(s) | PropertyValue::Select(s) => serde_json::Value::from(s.as_str()),
            PropertyValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            PropertyValue::Bool(b) => serde_json::Value::Bool(*b),
            PropertyValue::Date(d) => serde_json::Value::from(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Encode with a one-letter type tag, e.g. `e:red` or `n:2020`.
    pub(crate) fn encode_tagged(&self) -> String {
        match self {
            PropertyValue::Text(s) => format!("s:{}", s),
            PropertyValue::Number(n) => format!("n:{}", n),
            PropertyValue::Bool(b) => format!("b:{}", b),
            PropertyValue::Select(s) => format!("e:{}", s),
            PropertyValue::Date(d) => format!("d:{}", d.format("%Y-%m-%d")),
        }
    }

    /// Inverse of [`encode_tagged`](Self::encode_tagged).
    pub(crate) fn decode_tagged(key: &str, raw: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| {
            Error::from(InvalidInputError::Property {
                key: key.to_string(),
                reason: reason.to_string(),
            })
        };

        let (tag, value) = raw
            .split_once(':')
            .ok_or_else(|| invalid("missing type tag"))?;

        match tag {
            "s" => Ok(PropertyValue::Text(value.to_string())),
            "e" => Ok(PropertyValue::Select(value.to_string())),
            "n" => value
                .parse()
                .map(PropertyValue::Number)
                .map_err(|_| invalid("not a number")),
            "b" => value
                .parse()
                .map(PropertyValue::Bool)
                .map_err(|_| invalid("not a boolean")),
            "d" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(PropertyValue::Date)
                .map_err(|_| invalid("not a YYYY-MM-DD date")),
            _ => Err(invalid("unknown type tag")),
        }
    }

    fn validate(&self, key: &str) -> Result<(), Error> {
        let reason = match self {
            PropertyValue::Text(s) | PropertyValue::Select(s) if s.trim().is_empty() => {
                "value must not be blank"
            }
            PropertyValue::Number(n) if !n.is_finite() => "number must be finite",
            _ => return Ok(()),
        };
        Err(InvalidInputError::Property {
            key: key.to_string(),
            reason: reason.to_string(),
        }
        .into())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) | PropertyValue::Select(s) => write!(f, "{}", s),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// A validated `key = value` property filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    key: String,
    value: PropertyValue,
}

impl PropertyFilter {
    /// Create a filter, validating the key and value shape.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty key, blank text or a non-finite number.
    pub fn new(key: impl Into<String>, value: PropertyValue) -> Result<Self, Error> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(InvalidInputError::Property {
                key,
                reason: "key must not be empty".to_string(),
            }
            .into());
        }
        value.validate(&key)?;
        Ok(Self { key, value })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn into_parts(self) -> (String, PropertyValue) {
        (self.key, self.value)
    }
}

impl PropertyDefinition {
    /// Check a typed value against this definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the value's type does not match the declared kind
    /// or a select value is not one of the declared options.
    pub fn accept(&self, value: PropertyValue) -> Result<PropertyFilter, Error> {
        let mismatch = |reason: String| {
            Error::from(InvalidInputError::Property {
                key: self.key.clone(),
                reason,
            })
        };

        match (&self.kind, &value) {
            (PropertyKind::Text, PropertyValue::Text(_))
            | (PropertyKind::Number, PropertyValue::Number(_))
            | (PropertyKind::Bool, PropertyValue::Bool(_))
            | (PropertyKind::Date, PropertyValue::Date(_)) => {}
            (PropertyKind::Select { options }, PropertyValue::Select(choice)) => {
                if !options.iter().any(|o| o == choice) {
                    return Err(mismatch(format!(
                        "'{}' is not one of: {}",
                        choice,
                        options.join(", ")
                    )));
                }
            }
            (kind, value) => {
                return Err(mismatch(format!(
                    "expected a {:?} value, got {:?}",
                    kind, value
                )));
            }
        }

        PropertyFilter::new(self.key.clone(), value)
    }

    /// Parse a raw string (e.g. from the command line) according to this definition.
    pub fn parse_value(&self, raw: &str) -> Result<PropertyFilter, Error> {
        let invalid = |reason: &str| {
            Error::from(InvalidInputError::Property {
                key: self.key.clone(),
                reason: reason.to_string(),
            })
        };

        let value = match &self.kind {
            PropertyKind::Text => PropertyValue::Text(raw.to_string()),
            PropertyKind::Select { .. } => PropertyValue::Select(raw.to_string()),
            PropertyKind::Number => {
                PropertyValue::Number(raw.parse().map_err(|_| invalid("not a number"))?)
            }
            PropertyKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => PropertyValue::Bool(true),
                "false" | "no" | "0" => PropertyValue::Bool(false),
                _ => return Err(invalid("not a boolean")),
            },
            PropertyKind::Date => PropertyValue::Date(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| invalid("not a YYYY-MM-DD date"))?,
            ),
        };

        self.accept(value)
    }
}
