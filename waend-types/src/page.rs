//! Page requests, wire pages, and resolved pages.

use crate::id::{ItemId, QueryName};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One request against a remote paged query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Query the page belongs to. Doubles as the cache key.
    pub query_name: QueryName,
    /// Filter parameters sent along with the page number.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Requested page number.
    pub page: u32,
}

impl PageRequest {
    /// Create a request for `page` of `query_name` with no filters.
    pub fn new(query_name: impl Into<QueryName>, page: u32) -> Self {
        Self {
            query_name: query_name.into(),
            params: BTreeMap::new(),
            page,
        }
    }

    /// Add a filter parameter, builder style.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A page exactly as the paging endpoint returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Page number.
    pub number: u32,
    /// Total number of items across all pages.
    pub count: u64,
    /// Total number of pages.
    pub num_pages: u32,
    /// Item descriptors, each carrying an `id`.
    #[serde(default)]
    pub results: Vec<Value>,
}

/// An item held by a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item id.
    pub id: ItemId,
    /// The full descriptor as last received.
    pub data: Value,
}

impl Item {
    /// Build an item from a descriptor. Returns `None` when the descriptor
    /// has no usable `id`.
    pub fn from_descriptor(data: Value) -> Option<Self> {
        let id = ItemId::from_descriptor(&data)?;
        Some(Self { id, data })
    }

    /// The descriptor's `properties` object, if any.
    pub fn properties(&self) -> Option<&Value> {
        self.data.get("properties")
    }
}

/// A page whose results have been resolved to shared item references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number.
    pub number: u32,
    /// Total number of items across all pages.
    pub count: u64,
    /// Total number of pages.
    pub num_pages: u32,
    /// Items in server order.
    pub results: Vec<Arc<Item>>,
}

impl Page {
    /// The page delivered for a query with no results at all:
    /// `{number: 0, count: 0, num_pages: 0, results: []}`.
    pub fn empty() -> Self {
        Self {
            number: 0,
            count: 0,
            num_pages: 0,
            results: Vec::new(),
        }
    }

    /// Whether the page carries no items.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Ids of the page's items, in order.
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.results.iter().map(|item| &item.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_page_matches_wire_shape() {
        let value = serde_json::to_value(Page::empty()).unwrap();
        assert_eq!(
            value,
            json!({"number": 0, "count": 0, "num_pages": 0, "results": []})
        );
    }

    #[test]
    fn raw_page_parses_endpoint_body() {
        let body = json!({
            "number": 1,
            "count": 3,
            "num_pages": 2,
            "results": [{"id": 1}, {"id": "b"}]
        });
        let page: RawPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.results.len(), 2);
    }

    #[test]
    fn raw_page_results_default_to_empty() {
        let page: RawPage =
            serde_json::from_value(json!({"number": 0, "count": 0, "num_pages": 0})).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn item_keeps_properties() {
        let item =
            Item::from_descriptor(json!({"id": 7, "properties": {"name": "river"}})).unwrap();
        assert_eq!(item.id.as_str(), "7");
        assert_eq!(item.properties(), Some(&json!({"name": "river"})));
    }
}
