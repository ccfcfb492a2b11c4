//! Paginated list endpoints.
//!
//! CTFd list endpoints return at most [`PAGE_SIZE`] items per page and carry no
//! total count; a page with fewer items is the last one. Pages are requested
//! strictly in order and the result is fully materialized, since the worker
//! pool needs the total up front.

use serde::de::DeserializeOwned;

use crate::client::{ApiClient, FetchError};
use crate::config::PartialPagePolicy;

/// Fixed page size of the CTFd API.
pub const PAGE_SIZE: usize = 50;

/// Items collected from a list endpoint, and where collection stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct Pages<T> {
    pub items: Vec<T>,
    /// Number of pages that returned data.
    pub pages_fetched: u32,
    /// First page whose request failed, if any.
    pub failed_page: Option<u32>,
}

impl<T> Pages<T> {
    /// True when collection ended on a short page rather than an error.
    pub fn is_complete(&self) -> bool {
        self.failed_page.is_none()
    }

    /// Applies `policy` to the result. `None` means "list unavailable": page 1
    /// failed, or a later page failed and the policy discards partial lists.
    pub fn into_items(self, endpoint: &str, policy: PartialPagePolicy) -> Option<Vec<T>> {
        match self.failed_page {
            None => Some(self.items),
            Some(1) => None,
            Some(page) => match policy {
                PartialPagePolicy::Keep => {
                    tracing::warn!(
                        endpoint,
                        page,
                        kept = self.items.len(),
                        "list request failed part-way; keeping the pages already fetched"
                    );
                    Some(self.items)
                }
                PartialPagePolicy::Discard => {
                    tracing::warn!(
                        endpoint,
                        page,
                        "list request failed part-way; discarding partial list"
                    );
                    None
                }
            },
        }
    }
}

/// Collects pages from `fetch_page(1)`, `fetch_page(2)`, … until a page comes
/// back short (fewer than `page_size` items), empty, or failed.
pub fn collect_pages<T, F>(page_size: usize, mut fetch_page: F) -> Pages<T>
where
    F: FnMut(u32) -> Result<Vec<T>, FetchError>,
{
    let mut pages = Pages {
        items: Vec::new(),
        pages_fetched: 0,
        failed_page: None,
    };
    let mut page = 1u32;
    loop {
        let batch = match fetch_page(page) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::debug!(page, "page request failed: {}", e);
                pages.failed_page = Some(page);
                break;
            }
        };
        if batch.is_empty() {
            break;
        }
        let short = batch.len() < page_size;
        pages.items.extend(batch);
        pages.pages_fetched = page;
        if short {
            break;
        }
        page += 1;
    }
    pages
}

/// Fetches every page of `endpoint` (e.g. `/api/v1/teams`).
pub fn fetch_all_pages<T: DeserializeOwned>(client: &ApiClient, endpoint: &str) -> Pages<T> {
    collect_pages(PAGE_SIZE, |page| {
        client.fetch::<Vec<T>>(&format!("{}?page={}", endpoint, page))
    })
}
