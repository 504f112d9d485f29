#![deny(missing_docs)]
//! Paginated cursors over remote paged queries.
//!
//! A [`Collection`] sits in front of a [`PageSource`](waend_types::PageSource):
//! it stores every item it has seen by id and caches every page it has
//! fetched, keyed by query name and page number. [`Fragment`]s opened from a
//! collection navigate one query page by page; pages already in the cache
//! are served without touching the source.
//!
//! Cache retention is set with [`CacheConfig`]. The default keeps every
//! page; a bound turns each query's cache into an LRU of that many pages.

pub mod cache;
pub mod collection;
pub mod config;
pub mod fragment;

pub use cache::PageCache;
pub use collection::Collection;
pub use config::CacheConfig;
pub use fragment::{Fragment, Totals};
