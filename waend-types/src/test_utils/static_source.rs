//! StaticPageSource — fixture-backed PageSource that counts fetches.

use crate::error::FetchError;
use crate::id::{ItemId, QueryName};
use crate::page::{PageRequest, RawPage};
use crate::source::PageSource;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A page source serving fixed item lists, split into pages of a fixed size.
///
/// Content pages are numbered from 1. Page 0 is the page-count request and
/// answers with the first page's items. A page past the end answers 404.
/// Unknown queries answer as empty result sets.
pub struct StaticPageSource {
    page_size: usize,
    queries: HashMap<QueryName, Vec<Value>>,
    fail: bool,
    requests: Mutex<Vec<PageRequest>>,
}

impl StaticPageSource {
    /// Create a source with the given page size and no queries.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            queries: HashMap::new(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve `items` for `query`, builder style.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<QueryName>, items: Vec<Value>) -> Self {
        self.queries.insert(query.into(), items);
        self
    }

    /// Make every fetch fail with a transport error, builder style.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of page fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Snapshot of every page request received, in order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn fetch(&self, request: &PageRequest) -> Result<RawPage, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(FetchError::Transport("connection refused".into()));
        }

        let items = self
            .queries
            .get(&request.query_name)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let num_pages = items.len().div_ceil(self.page_size) as u32;
        let index = request.page.max(1);
        if index > num_pages.max(1) {
            return Err(FetchError::Status {
                status: 404,
                body: format!("invalid page {}", request.page),
            });
        }

        let results = items
            .chunks(self.page_size)
            .nth(index as usize - 1)
            .map(<[Value]>::to_vec)
            .unwrap_or_default();
        Ok(RawPage {
            number: request.page,
            count: items.len() as u64,
            num_pages,
            results,
        })
    }

    async fn fetch_item(&self, id: &ItemId) -> Result<Option<Value>, FetchError> {
        if self.fail {
            return Err(FetchError::Transport("connection refused".into()));
        }
        Ok(self
            .queries
            .values()
            .flatten()
            .find(|item| ItemId::from_descriptor(item).as_ref() == Some(id))
            .cloned())
    }
}
