//! Accumulated pages for one query identity.

use crate::catalog::ProductPage;

/// Pages fetched so far, in fetch order.
#[derive(Debug, Clone)]
pub struct PageSequence<T> {
    pages: Vec<Vec<T>>,
    total: Option<u64>,
    exhausted: bool,
}

impl<T> Default for PageSequence<T> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            total: None,
            exhausted: false,
        }
    }
}

impl<T> PageSequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page and record the total the server reported with it.
    pub fn push(&mut self, page: ProductPage<T>) {
        // An empty page is the server saying there is nothing after this.
        self.exhausted = page.items.is_empty();
        self.total = page.total;
        self.pages.push(page.items);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of pages fetched.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of items across all pages.
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    /// Total reported with the most recent page.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Whether another page can be requested.
    ///
    /// True only while the accumulated count is below the reported total.
    /// A missing total or an empty page ends pagination.
    pub fn has_more(&self) -> bool {
        if self.pages.is_empty() || self.exhausted {
            return false;
        }
        match self.total {
            Some(total) => (self.item_count() as u64) < total,
            None => false,
        }
    }

    /// All items, flattened in page order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flatten()
    }

    pub fn pages(&self) -> &[Vec<T>] {
        &self.pages
    }
}
