//! Skip/limit windows and the paginated envelope returned by list endpoints.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of items per page.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page a client may request.
pub const MAX_LIMIT: i64 = 100;

/// A window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Build a page from optional query values, applying defaults and bounds.
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Result<Self> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if skip < 0 {
            return Err(Error::validation_field("skip", "must be 0 or greater"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(Error::validation_field(
                "limit",
                format!("must be between 1 and {MAX_LIMIT}"),
            ));
        }
        Ok(Self { skip, limit })
    }

    /// 1-based page number this window starts on.
    pub fn number(&self) -> i64 {
        self.skip / self.limit + 1
    }

    /// Slice an in-memory listing to this window.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

/// One page of results plus the totals a client needs to page further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page.limit - 1) / page.limit
        };
        Self {
            items,
            total,
            page: page.number(),
            page_size: page.limit,
            total_pages,
        }
    }

    /// Convert every item, keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
