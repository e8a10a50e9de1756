//! Drives a [`ListController`] against a [`CatalogSource`].
//!
//! Each fetch the controller issues runs as its own task. When the query
//! identity changes, tasks for the old identity are aborted; anything that
//! still slips through is dropped by the controller as stale.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use bazaar_core::filter::FilterField;
use bazaar_core::{
    Applied, CatalogSource, CategoryId, FetchRequest, ListController, PageResponse, Product,
    Result,
};

/// A product list plus the fetches currently running for it.
pub struct CatalogFeed<S> {
    source: Arc<S>,
    controller: ListController<Product>,
    tasks: JoinSet<PageResponse<Product>>,
}

impl<S: CatalogSource + 'static> CatalogFeed<S> {
    pub fn new(source: Arc<S>, controller: ListController<Product>) -> Self {
        Self {
            source,
            controller,
            tasks: JoinSet::new(),
        }
    }

    pub fn controller(&self) -> &ListController<Product> {
        &self.controller
    }

    pub fn items(&self) -> impl Iterator<Item = &Product> {
        self.controller.items()
    }

    pub fn set_filter_field(&mut self, field: FilterField) {
        self.controller.set_filter_field(field);
    }

    pub fn set_scope(&mut self, scope: Option<CategoryId>) {
        self.controller.set_scope(scope);
    }

    /// Apply pending filter edits. Returns whether a new first page was
    /// started.
    ///
    /// # Errors
    ///
    /// Returns an error if the filters fail validation.
    pub fn sync(&mut self) -> Result<bool> {
        let request = self.controller.sync()?;
        Ok(self.restart(request))
    }

    /// Reset every filter and restart the list.
    ///
    /// # Errors
    ///
    /// See [`ListController::clear_filters`].
    pub fn clear_filters(&mut self) -> Result<bool> {
        let request = self.controller.clear_filters()?;
        Ok(self.restart(request))
    }

    /// Start the next page if one can be fetched.
    pub fn fetch_next_page(&mut self) -> bool {
        match self.controller.fetch_next_page() {
            Some(request) => {
                self.spawn(request);
                true
            }
            None => false,
        }
    }

    /// Re-run a failed fetch.
    pub fn retry(&mut self) -> bool {
        match self.controller.retry() {
            Some(request) => {
                self.spawn(request);
                true
            }
            None => false,
        }
    }

    /// Wait for the next fetch to finish and apply it.
    ///
    /// Returns `None` when nothing is running.
    pub async fn next_applied(&mut self) -> Option<Applied> {
        loop {
            match self.tasks.join_next().await? {
                Ok(response) => return Some(self.controller.apply_page(response)),
                Err(err) if err.is_cancelled() => {
                    debug!("superseded fetch cancelled");
                }
                Err(err) => {
                    warn!(error = %err, "fetch task panicked");
                    std::panic::resume_unwind(err.into_panic());
                }
            }
        }
    }

    /// Wait until the list is no longer loading.
    ///
    /// Returns the last non-stale outcome, if any fetch completed.
    pub async fn wait_idle(&mut self) -> Option<Applied> {
        let mut last = None;
        while self.controller.is_loading() {
            match self.next_applied().await {
                Some(Applied::Stale) => continue,
                Some(applied) => last = Some(applied),
                None => break,
            }
        }
        last
    }

    /// Fetch the next page and wait for it.
    ///
    /// Returns `None` if no page could be started.
    pub async fn load_next_page(&mut self) -> Option<Applied> {
        if !self.fetch_next_page() {
            return None;
        }
        self.wait_idle().await
    }

    fn restart(&mut self, request: Option<FetchRequest>) -> bool {
        let Some(request) = request else {
            return false;
        };
        if !self.tasks.is_empty() {
            debug!(superseded = self.tasks.len(), "aborting fetches for old query");
            self.tasks.abort_all();
        }
        self.spawn(request);
        true
    }

    #[instrument(skip(self, request), fields(key = %request.key, page = request.query.page))]
    fn spawn(&mut self, request: FetchRequest) {
        debug!("spawning page fetch");
        let source = Arc::clone(&self.source);
        self.tasks.spawn(async move {
            let result = source.fetch_page(&request.query).await;
            request.respond(result)
        });
    }
}

impl<S> std::fmt::Debug for CatalogFeed<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogFeed")
            .field("controller", &self.controller)
            .field("running", &self.tasks.len())
            .finish()
    }
}
