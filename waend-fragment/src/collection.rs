//! Collection — item store plus page cache in front of a [`PageSource`].

use crate::cache::PageCache;
use crate::config::CacheConfig;
use crate::fragment::Fragment;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use waend_types::{
    Args, Component, ComponentError, EventEmitter, FragmentError, Item, ItemId, MethodTable, Page,
    PageRequest, PageSource, QueryName, RawPage,
};

/// Owns the items returned by a paged source and the pages they came in.
///
/// Every fetched descriptor is stored (or replaced) by id, and every fetched
/// page is cached as a list of shared item references, so two pages that
/// list the same item point at the same [`Item`].
///
/// A collection is also a [`Component`]: register it with an object proxy to
/// expose `get`, `len`, and `reset_fragment` by name, and to let others
/// listen for its `page` event.
pub struct Collection<S: PageSource + ?Sized = dyn PageSource> {
    source: Arc<S>,
    items: RwLock<HashMap<ItemId, Arc<Item>>>,
    cache: Mutex<PageCache>,
    events: EventEmitter,
    methods: MethodTable<Collection<S>>,
}

impl<S: PageSource + ?Sized> Collection<S> {
    /// Create a collection over `source` that caches every page.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    /// Create a collection with an explicit cache retention.
    pub fn with_config(source: Arc<S>, config: CacheConfig) -> Self {
        Self {
            source,
            items: RwLock::new(HashMap::new()),
            cache: Mutex::new(PageCache::new(config)),
            events: EventEmitter::new(),
            methods: MethodTable::new()
                .with("get", Self::get_method)
                .with("len", Self::len_method)
                .with("reset_fragment", Self::reset_method),
        }
    }

    fn cache(&self) -> MutexGuard<'_, PageCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The page source this collection fetches from.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Look up a stored item by id.
    pub fn get(&self, id: &ItemId) -> Option<Arc<Item>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a descriptor, replacing any item with the same id.
    /// Returns `None` if the descriptor has no usable `id`.
    pub fn insert(&self, descriptor: Value) -> Option<Arc<Item>> {
        let item = Arc::new(Item::from_descriptor(descriptor)?);
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(item.id.clone(), Arc::clone(&item));
        Some(item)
    }

    /// Number of pages currently cached for `query`.
    pub fn cached_pages(&self, query: &QueryName) -> usize {
        self.cache().pages_for(query)
    }

    /// Forget every cached page of `query`. Stored items are kept.
    pub fn reset_fragment(&self, query: &QueryName) -> usize {
        let dropped = self.cache().remove_query(query);
        tracing::debug!(query = %query, dropped, "waend.collection.reset");
        dropped
    }

    /// Fetch `page` of `query`, or serve it from the cache.
    ///
    /// On a miss the page is fetched, its descriptors are stored, their ids
    /// are resolved to stored items in server order, and the resolved page
    /// is cached before it is returned. Emits `page` with
    /// `{"query", "page"}` after caching a freshly fetched page.
    pub async fn query_page(
        &self,
        query: &QueryName,
        params: &BTreeMap<String, String>,
        page: u32,
    ) -> Result<Page, FragmentError> {
        let cached = self.cache().get(query, page);
        if let Some(hit) = cached {
            tracing::trace!(query = %query, page, "waend.collection.cache_hit");
            return Ok(hit);
        }

        let request = PageRequest {
            query_name: query.clone(),
            params: params.clone(),
            page,
        };
        tracing::debug!(query = %query, page, "waend.collection.fetch");
        let raw = self.source.fetch(&request).await.map_err(|error| {
            tracing::warn!(query = %query, page, error = %error, "waend.collection.fetch_failed");
            FragmentError::Fetch(error)
        })?;

        let resolved = self.absorb(raw);
        self.cache().insert(query, page, resolved.clone());
        self.events
            .emit("page", &json!({"query": query.as_str(), "page": page}));
        Ok(resolved)
    }

    fn absorb(&self, raw: RawPage) -> Page {
        let ids: Vec<ItemId> = raw
            .results
            .into_iter()
            .filter_map(|descriptor| match self.insert(descriptor) {
                Some(item) => Some(item.id.clone()),
                None => {
                    tracing::warn!("waend.collection.descriptor_without_id");
                    None
                }
            })
            .collect();

        let results = {
            let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
            ids.iter().filter_map(|id| items.get(id).cloned()).collect()
        };

        Page {
            number: raw.number,
            count: raw.count,
            num_pages: raw.num_pages,
            results,
        }
    }

    /// The stored item `id`, fetching it from the source if it is missing.
    /// Returns `None` if the source does not know the item either.
    pub async fn get_or_fetch(&self, id: &ItemId) -> Result<Option<Arc<Item>>, FragmentError> {
        if let Some(item) = self.get(id) {
            return Ok(Some(item));
        }

        let Some(data) = self.source.fetch_item(id).await? else {
            tracing::debug!(id = %id, "waend.collection.item_missing");
            return Ok(None);
        };
        let item = Arc::new(Item {
            id: id.clone(),
            data,
        });
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::clone(&item));
        Ok(Some(item))
    }

    fn get_method(&self, args: Args) -> Result<Value, ComponentError> {
        let id = args
            .get(0)
            .and_then(|raw| ItemId::from_descriptor(&json!({ "id": raw })))
            .ok_or_else(|| ComponentError::InvalidArgs("get expects an item id".into()))?;
        Ok(self
            .get(&id)
            .map_or(Value::Null, |item| item.data.clone()))
    }

    fn len_method(&self, _args: Args) -> Result<Value, ComponentError> {
        Ok(json!(self.len()))
    }

    fn reset_method(&self, args: Args) -> Result<Value, ComponentError> {
        let query: String = args.parse(0)?;
        Ok(json!(self.reset_fragment(&QueryName::new(query))))
    }
}

impl<S: PageSource + ?Sized + 'static> Collection<S> {
    /// Open a cursor over `query` with no filter parameters.
    ///
    /// See [`cursor_with_params`](Collection::cursor_with_params).
    pub fn cursor(self: &Arc<Self>, query: impl Into<QueryName>) -> Fragment<S> {
        self.cursor_with_params(query, BTreeMap::new())
    }

    /// Open a cursor over `query`, sending `params` with every page request.
    ///
    /// The page-count request (page 0) is spawned immediately on the current
    /// Tokio runtime; navigation on the returned cursor waits for it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn cursor_with_params(
        self: &Arc<Self>,
        query: impl Into<QueryName>,
        params: BTreeMap<String, String>,
    ) -> Fragment<S> {
        Fragment::open(Arc::clone(self), query.into(), params)
    }
}

impl<S: PageSource + ?Sized> Component for Collection<S> {
    fn invoke(&self, method: &str, args: Args) -> Result<Value, ComponentError> {
        self.methods.invoke(self, method, args)
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }
}

impl<S: PageSource + ?Sized> fmt::Debug for Collection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("items", &self.len())
            .field("cached_pages", &self.cache().len())
            .finish()
    }
}
