//! Phone number type used for OTP login.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated phone number.
///
/// Accepts an optional leading `+` followed by 7 to 15 digits. Spaces and
/// dashes are stripped before validation.
///
/// # Example
///
/// ```
/// use bazaar_core::PhoneNumber;
///
/// let phone = PhoneNumber::new("+998 90 123-45-67").unwrap();
/// assert_eq!(phone.as_str(), "+998901234567");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a new phone number, normalizing separators.
    ///
    /// # Errors
    ///
    /// Returns an error if the number has the wrong shape.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let raw = s.as_ref();
        let normalized: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();

        let digits = normalized.strip_prefix('+').unwrap_or(&normalized);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidInputError::Phone {
                value: raw.to_string(),
                reason: "must contain only digits after an optional '+'".to_string(),
            }
            .into());
        }

        if !(7..=15).contains(&digits.len()) {
            return Err(InvalidInputError::Phone {
                value: raw.to_string(),
                reason: "must have between 7 and 15 digits".to_string(),
            }
            .into());
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
