//! Core traits at the seams to the backend and to persistent storage.

mod catalog;
mod store;

pub use catalog::CatalogSource;
pub use store::{MemoryTokenStore, TokenStore};
