//! Page cache configuration.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// How long a collection keeps fetched pages.
///
/// The default keeps every page for the collection's lifetime. Setting
/// `max_pages_per_query` bounds each query to that many pages, evicting the
/// least recently used page first.
///
/// Deserializes from e.g. `{"max_pages_per_query": 16}`; missing fields take
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upper bound on cached pages per query. `None` = unbounded.
    pub max_pages_per_query: Option<NonZeroUsize>,
}

impl CacheConfig {
    /// Keep every page.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Keep at most `pages` pages per query. Zero is treated as one.
    pub fn bounded(pages: usize) -> Self {
        Self {
            max_pages_per_query: Some(NonZeroUsize::new(pages).unwrap_or(NonZeroUsize::MIN)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_is_unbounded() {
        assert_eq!(CacheConfig::default().max_pages_per_query, None);
        let parsed: CacheConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(parsed, CacheConfig::unbounded());
    }

    #[test]
    fn bound_parses_from_json() {
        let parsed: CacheConfig =
            serde_json::from_value(json!({"max_pages_per_query": 4})).unwrap();
        assert_eq!(parsed, CacheConfig::bounded(4));
    }

    #[test]
    fn zero_bound_is_clamped() {
        assert_eq!(
            CacheConfig::bounded(0).max_pages_per_query.map(NonZeroUsize::get),
            Some(1)
        );
    }

    #[test]
    fn zero_bound_is_rejected_from_json() {
        let parsed = serde_json::from_value::<CacheConfig>(json!({"max_pages_per_query": 0}));
        assert!(parsed.is_err());
    }
}
