//! The Paging seam — where pages come from.

use crate::error::FetchError;
use crate::id::ItemId;
use crate::page::{PageRequest, RawPage};
use async_trait::async_trait;

/// Seam ② — Paging
///
/// Fetches pages of a remote paginated query. Implementations decide the
/// transport: an HTTP endpoint, a fixture table, a local index.
///
/// A source does no caching of its own; the owning collection caches
/// resolved pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page.
    async fn fetch(&self, request: &PageRequest) -> Result<RawPage, FetchError>;

    /// Fetch a single item descriptor by id.
    /// Returns `None` if the item does not exist. Sources that cannot
    /// address single items keep the default, which always returns `None`.
    async fn fetch_item(&self, id: &ItemId) -> Result<Option<serde_json::Value>, FetchError> {
        let _ = id;
        Ok(None)
    }
}
