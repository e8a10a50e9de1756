//! List controller state machine.

use tracing::{debug, trace};

use crate::catalog::{CategoryId, Product, ProductPage};
use crate::error::Error;
use crate::filter::{FilterDescriptor, FilterField, ProductQuery, QueryKey};

use super::DEFAULT_PAGE_SIZE;
use super::pages::PageSequence;

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Where a list is in its fetch lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    /// Filters being edited; nothing fetched for the current identity yet.
    Idle,
    /// The first page for the current identity is in flight.
    FetchingFirstPage,
    /// At least one page loaded and more can be fetched.
    HasPages,
    /// A continuation page is in flight.
    FetchingNextPage,
    /// Everything the server has for this identity is loaded.
    Exhausted,
    /// The last fetch failed; [`ListController::retry`] re-issues it.
    Failed { page: u32, message: String },
}

/// A fetch the owner of the controller must run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub key: QueryKey,
    pub query: ProductQuery,
}

impl FetchRequest {
    /// Pair this request with its outcome.
    pub fn respond<T>(&self, result: Result<ProductPage<T>, Error>) -> PageResponse<T> {
        PageResponse {
            ticket: self.ticket,
            key: self.key.clone(),
            result,
        }
    }
}

/// The outcome of a [`FetchRequest`].
#[derive(Debug)]
pub struct PageResponse<T> {
    pub ticket: Ticket,
    pub key: QueryKey,
    pub result: Result<ProductPage<T>, Error>,
}

/// What [`ListController::apply_page`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The page was appended.
    Appended { items: usize, has_more: bool },
    /// The fetch failed; the list is now [`ListState::Failed`].
    Failed,
    /// The response belonged to a superseded request and was dropped.
    Stale,
}

/// The identity the held pages belong to, with the inputs that produced it.
#[derive(Debug, Clone)]
struct Synced {
    key: QueryKey,
    scope: Option<CategoryId>,
    filters: FilterDescriptor,
}

/// Owns filter state, query identity and accumulated pages for one list.
///
/// Edits to scope and filters are staged; every request is built from the
/// snapshot taken by the last successful [`sync`](ListController::sync).
#[derive(Debug)]
pub struct ListController<T = Product> {
    scope: Option<CategoryId>,
    filters: FilterDescriptor,
    page_size: u32,
    synced: Option<Synced>,
    pages: PageSequence<T>,
    state: ListState,
    in_flight: Option<Ticket>,
    next_ticket: u64,
}

impl<T> Default for ListController<T> {
    fn default() -> Self {
        Self::new(None, DEFAULT_PAGE_SIZE)
    }
}

impl<T> ListController<T> {
    pub fn new(scope: Option<CategoryId>, page_size: u32) -> Self {
        Self {
            scope,
            filters: FilterDescriptor::new(),
            page_size: page_size.max(1),
            synced: None,
            pages: PageSequence::new(),
            state: ListState::Idle,
            in_flight: None,
            next_ticket: 0,
        }
    }

    /// Start from an existing descriptor, e.g. one restored from the URL.
    pub fn with_filters(mut self, filters: FilterDescriptor) -> Self {
        self.filters = filters;
        self
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn scope(&self) -> Option<&CategoryId> {
        self.scope.as_ref()
    }

    pub fn filters(&self) -> &FilterDescriptor {
        &self.filters
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Identity of the pages currently held, if any fetch was started.
    pub fn query_key(&self) -> Option<&QueryKey> {
        self.synced.as_ref().map(|synced| &synced.key)
    }

    pub fn pages(&self) -> &PageSequence<T> {
        &self.pages
    }

    /// All loaded items, in server order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.items()
    }

    pub fn has_more(&self) -> bool {
        self.state == ListState::HasPages
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            ListState::FetchingFirstPage | ListState::FetchingNextPage
        )
    }

    /// Badge count of active filters.
    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count()
    }

    /// Edit one filter. Nothing is fetched until [`sync`](Self::sync).
    pub fn set_filter_field(&mut self, field: FilterField) {
        trace!(?field, "filter edited");
        self.filters.set(field);
    }

    /// Switch to another category.
    ///
    /// Filters reset to defaults except the search text. Takes effect at the
    /// next [`sync`](Self::sync).
    pub fn set_scope(&mut self, scope: Option<CategoryId>) {
        if self.scope != scope {
            debug!(from = ?self.scope, to = ?scope, "scope changed");
            self.filters.reset_for_scope_change();
            self.scope = scope;
        }
    }

    /// Reset all filters and restart the list.
    ///
    /// # Errors
    ///
    /// Never fails for default filters; the `Result` mirrors [`sync`](Self::sync).
    pub fn clear_filters(&mut self) -> Result<Option<FetchRequest>, Error> {
        self.filters.clear();
        self.sync()
    }

    /// Recompute the query identity and restart the list if it changed.
    ///
    /// Returns the first-page request to run, or `None` when the identity is
    /// unchanged. Any fetch still in flight for the old identity becomes stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor fails validation; the previous
    /// identity and its pages are kept.
    pub fn sync(&mut self) -> Result<Option<FetchRequest>, Error> {
        let key = QueryKey::new(self.scope.as_ref(), &self.filters);
        if self.query_key() == Some(&key) {
            return Ok(None);
        }

        self.filters.validate()?;

        debug!(%key, "query identity changed, restarting list");
        self.synced = Some(Synced {
            key,
            scope: self.scope.clone(),
            filters: self.filters.clone(),
        });
        self.pages.clear();
        Ok(self.issue(1, ListState::FetchingFirstPage))
    }

    /// Request the next page.
    ///
    /// A no-op unless pages are loaded, more are available and nothing is in
    /// flight. Unsynced edits do not apply to continuation pages.
    pub fn fetch_next_page(&mut self) -> Option<FetchRequest> {
        if self.state != ListState::HasPages {
            trace!(state = ?self.state, "fetch next ignored");
            return None;
        }
        let page = self.pages.len() as u32 + 1;
        self.issue(page, ListState::FetchingNextPage)
    }

    /// Re-issue the fetch that failed.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        let ListState::Failed { page, .. } = self.state else {
            return None;
        };
        let next = if page == 1 {
            ListState::FetchingFirstPage
        } else {
            ListState::FetchingNextPage
        };
        self.issue(page, next)
    }

    /// Feed back the outcome of a fetch.
    ///
    /// Responses for a superseded identity, or for a ticket that is no longer
    /// in flight, are dropped without touching the list.
    pub fn apply_page(&mut self, response: PageResponse<T>) -> Applied {
        if self.in_flight != Some(response.ticket) || self.query_key() != Some(&response.key) {
            debug!(key = %response.key, "dropping stale page response");
            return Applied::Stale;
        }
        self.in_flight = None;

        let page_number = self.pages.len() as u32 + 1;
        match response.result {
            Ok(page) => {
                let items = page.items.len();
                self.pages.push(page);
                let has_more = self.pages.has_more();
                self.state = if has_more {
                    ListState::HasPages
                } else {
                    ListState::Exhausted
                };
                debug!(
                    page = page_number,
                    items,
                    loaded = self.pages.item_count(),
                    total = ?self.pages.total(),
                    has_more,
                    "page applied"
                );
                Applied::Appended { items, has_more }
            }
            Err(err) => {
                debug!(page = page_number, error = %err, "page fetch failed");
                self.state = ListState::Failed {
                    page: page_number,
                    message: err.to_string(),
                };
                Applied::Failed
            }
        }
    }

    fn issue(&mut self, page: u32, state: ListState) -> Option<FetchRequest> {
        let synced = self.synced.as_ref()?;
        let key = synced.key.clone();
        let query = ProductQuery::new(
            synced.scope.as_ref(),
            &synced.filters,
            page,
            self.page_size,
        );

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.state = state;

        Some(FetchRequest { ticket, key, query })
    }
}
