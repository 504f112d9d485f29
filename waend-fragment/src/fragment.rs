//! Fragment — a cursor over one remote paged query.

use crate::collection::Collection;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use waend_types::{FragmentError, Page, PageSource, QueryName};

/// Page-count metadata from the initial request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Total number of pages.
    pub pages: u32,
    /// Total number of items.
    pub items: u64,
}

#[derive(Debug, Clone)]
enum Readiness {
    Pending,
    Ready(Totals),
    Failed(String),
}

/// A cursor over one remote paged query.
///
/// Opening a fragment requests page 0 to learn the page and item counts.
/// Until that answer arrives the fragment is not ready, and every navigation
/// call waits for it before doing anything. Readiness happens once; if the
/// initial request fails, every navigation call fails with
/// [`FragmentError::Init`].
///
/// Navigation never moves [`current`](Fragment::current): callers track
/// their position with [`set_current`](Fragment::set_current) and
/// [`rewind`](Fragment::rewind).
///
/// Each navigation call resolves to:
/// - `Ok(Some(page))`: the page, from the cache or freshly fetched;
/// - `Ok(None)`: the requested page is out of range, nothing was fetched;
/// - `Err(_)`: the fetch or the initial request failed.
pub struct Fragment<S: PageSource + ?Sized = dyn PageSource> {
    collection: Arc<Collection<S>>,
    query_name: QueryName,
    params: BTreeMap<String, String>,
    current: i64,
    readiness: watch::Receiver<Readiness>,
}

impl<S: PageSource + ?Sized + 'static> Fragment<S> {
    pub(crate) fn open(
        collection: Arc<Collection<S>>,
        query_name: QueryName,
        params: BTreeMap<String, String>,
    ) -> Self {
        let (tx, readiness) = watch::channel(Readiness::Pending);

        let task_collection = Arc::clone(&collection);
        let task_query = query_name.clone();
        let task_params = params.clone();
        tokio::spawn(async move {
            let state = match task_collection
                .query_page(&task_query, &task_params, 0)
                .await
            {
                Ok(first) => {
                    let totals = Totals {
                        pages: first.num_pages,
                        items: first.count,
                    };
                    tracing::info!(
                        query = %task_query,
                        pages = totals.pages,
                        items = totals.items,
                        "waend.fragment.ready"
                    );
                    Readiness::Ready(totals)
                }
                Err(error) => {
                    tracing::warn!(
                        query = %task_query,
                        error = %error,
                        "waend.fragment.init_failed"
                    );
                    Readiness::Failed(error.to_string())
                }
            };
            tx.send_replace(state);
        });

        Self {
            collection,
            query_name,
            params,
            current: -1,
            readiness,
        }
    }
}

impl<S: PageSource + ?Sized> Fragment<S> {
    /// Wait until the page-count metadata is known.
    pub async fn ready(&self) -> Result<Totals, FragmentError> {
        let mut rx = self.readiness.clone();
        loop {
            let state = rx.borrow_and_update().clone();
            match state {
                Readiness::Ready(totals) => return Ok(totals),
                Readiness::Failed(message) => return Err(FragmentError::Init(message)),
                Readiness::Pending => {}
            }
            if rx.changed().await.is_err() {
                let last = rx.borrow().clone();
                return match last {
                    Readiness::Ready(totals) => Ok(totals),
                    Readiness::Failed(message) => Err(FragmentError::Init(message)),
                    Readiness::Pending => Err(FragmentError::Closed),
                };
            }
        }
    }

    /// Whether the page-count metadata has arrived.
    pub fn is_ready(&self) -> bool {
        matches!(*self.readiness.borrow(), Readiness::Ready(_))
    }

    fn totals(&self) -> Option<Totals> {
        match *self.readiness.borrow() {
            Readiness::Ready(totals) => Some(totals),
            _ => None,
        }
    }

    /// Total number of pages, once ready.
    pub fn total_pages(&self) -> Option<u32> {
        self.totals().map(|t| t.pages)
    }

    /// Total number of items, once ready.
    pub fn total_items(&self) -> Option<u64> {
        self.totals().map(|t| t.items)
    }

    /// The query this fragment pages through.
    pub fn query_name(&self) -> &QueryName {
        &self.query_name
    }

    /// The collection that owns this fragment's pages.
    pub fn collection(&self) -> &Arc<Collection<S>> {
        &self.collection
    }

    /// The caller's current page; `-1` until set.
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Record the page the caller is now on.
    pub fn set_current(&mut self, page: u32) {
        self.current = i64::from(page);
    }

    /// Set the current page to 0.
    pub fn rewind(&mut self) -> &mut Self {
        self.current = 0;
        self
    }

    /// The page after [`current`](Fragment::current).
    ///
    /// When the query has no pages at all and the cursor has been rewound,
    /// yields [`Page::empty`] without a fetch.
    pub async fn next(&self) -> Result<Option<Page>, FragmentError> {
        let totals = self.ready().await?;
        let requested = self.current + 1;
        if requested <= i64::from(totals.pages) {
            return self.fetch("next", requested).await;
        }
        if totals.pages == 0 && self.current == 0 {
            tracing::debug!(query = %self.query_name, "waend.fragment.next.empty");
            return Ok(Some(Page::empty()));
        }
        Ok(None)
    }

    /// The page before [`current`](Fragment::current). Page 0 is never
    /// requested this way.
    pub async fn previous(&self) -> Result<Option<Page>, FragmentError> {
        self.ready().await?;
        let requested = self.current - 1;
        if requested > 0 {
            return self.fetch("previous", requested).await;
        }
        Ok(None)
    }

    /// An arbitrary page, if it is within the page count.
    pub async fn at(&self, page: u32) -> Result<Option<Page>, FragmentError> {
        let totals = self.ready().await?;
        if page <= totals.pages {
            return self.fetch("at", i64::from(page)).await;
        }
        Ok(None)
    }

    async fn fetch(&self, op: &'static str, page: i64) -> Result<Option<Page>, FragmentError> {
        let Ok(page) = u32::try_from(page) else {
            return Ok(None);
        };
        tracing::debug!(query = %self.query_name, op, page, "waend.fragment.request");
        self.collection
            .query_page(&self.query_name, &self.params, page)
            .await
            .map(Some)
    }
}

impl<S: PageSource + ?Sized> fmt::Debug for Fragment<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("query_name", &self.query_name)
            .field("params", &self.params)
            .field("current", &self.current)
            .field("readiness", &*self.readiness.borrow())
            .finish()
    }
}
