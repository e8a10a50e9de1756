//! Filtered, paginated list controller.
//!
//! The controller is a synchronous state machine: it hands out
//! [`FetchRequest`]s and is told about their outcome through
//! [`ListController::apply_page`]. Running the requests is the caller's job,
//! which keeps the controller free of any runtime.

mod controller;
mod pages;

pub use controller::{Applied, FetchRequest, ListController, ListState, PageResponse, Ticket};
pub use pages::PageSequence;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
