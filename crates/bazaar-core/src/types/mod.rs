//! Validated input types.
//!
//! These types enforce their invariants at construction time,
//! so a value that exists is a value the API will accept.

mod api_url;
mod phone;

pub use api_url::ApiUrl;
pub use phone::PhoneNumber;
