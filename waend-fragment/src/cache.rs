//! Page cache keyed by (query name, page number).

use crate::config::CacheConfig;
use std::collections::{HashMap, VecDeque};
use waend_types::{Page, QueryName};

#[derive(Default)]
struct QueryPages {
    pages: HashMap<u32, Page>,
    /// Page numbers, least recently used first.
    recency: VecDeque<u32>,
}

impl QueryPages {
    fn touch(&mut self, number: u32) {
        if let Some(pos) = self.recency.iter().position(|n| *n == number) {
            self.recency.remove(pos);
        }
        self.recency.push_back(number);
    }
}

/// Fetched pages, grouped by query, with the retention set by [`CacheConfig`].
#[derive(Default)]
pub struct PageCache {
    config: CacheConfig,
    queries: HashMap<QueryName, QueryPages>,
}

impl PageCache {
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            queries: HashMap::new(),
        }
    }

    /// The cached copy of `page` for `query`, marking it recently used.
    pub fn get(&mut self, query: &QueryName, page: u32) -> Option<Page> {
        let entry = self.queries.get_mut(query)?;
        let hit = entry.pages.get(&page)?.clone();
        entry.touch(page);
        Some(hit)
    }

    /// Store `page` under `(query, number)`, evicting the least recently
    /// used page of that query if the bound is exceeded.
    pub fn insert(&mut self, query: &QueryName, number: u32, page: Page) {
        let entry = self.queries.entry(query.clone()).or_default();
        entry.pages.insert(number, page);
        entry.touch(number);

        if let Some(limit) = self.config.max_pages_per_query {
            while entry.pages.len() > limit.get() {
                let Some(oldest) = entry.recency.pop_front() else {
                    break;
                };
                entry.pages.remove(&oldest);
                tracing::trace!(query = %query, page = oldest, "waend.cache.evict");
            }
        }
    }

    /// Drop every page of `query`. Returns how many were dropped.
    pub fn remove_query(&mut self, query: &QueryName) -> usize {
        self.queries
            .remove(query)
            .map_or(0, |entry| entry.pages.len())
    }

    /// Number of pages cached for `query`.
    pub fn pages_for(&self, query: &QueryName) -> usize {
        self.queries.get(query).map_or(0, |entry| entry.pages.len())
    }

    /// Total number of cached pages.
    pub fn len(&self) -> usize {
        self.queries.values().map(|entry| entry.pages.len()).sum()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The retention in effect.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
