//! GatedPageSource — holds every fetch until the test releases it.

use crate::error::FetchError;
use crate::id::ItemId;
use crate::page::{PageRequest, RawPage};
use crate::source::PageSource;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Wraps another source; each fetch counts itself as started, then waits for
/// a permit from [`release`](GatedPageSource::release) before delegating.
pub struct GatedPageSource<S> {
    inner: Arc<S>,
    gate: Semaphore,
    started: AtomicUsize,
}

impl<S: PageSource> GatedPageSource<S> {
    /// Gate `inner`. No fetch completes until released.
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
        }
    }

    /// Let `n` more fetches through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Number of fetches that have started, released or not.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: PageSource> PageSource for GatedPageSource<S> {
    async fn fetch(&self, request: &PageRequest) -> Result<RawPage, FetchError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        permit.forget();
        self.inner.fetch(request).await
    }

    async fn fetch_item(&self, id: &ItemId) -> Result<Option<Value>, FetchError> {
        self.inner.fetch_item(id).await
    }
}
