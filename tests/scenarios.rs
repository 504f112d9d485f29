//! End-to-end scenarios across the proxy and the paginated cursor.
//!
//! 1. **Deferred navigation** — a call to a router made before the router exists
//! 2. **Empty query** — a cursor over a query with no matching items
//! 3. **Wiring** — a collection, a browser panel, and a map that registers last
//!
//! All tests run without a network by using the fixture page source.

use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use waend::prelude::*;
use waend_types::test_utils::{RecordingComponent, StaticPageSource};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 1. Deferred navigation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn router_navigates_once_after_registering() {
    init_tracing();
    let proxy = ObjectProxy::new();
    let router = Arc::new(RecordingComponent::new());

    let ran = proxy.delegate("router", "navigate", json!(["workspace"]));
    assert!(!ran);
    assert!(router.calls().is_empty(), "no navigation before registration");

    proxy.register("router", &router).unwrap();

    let navigations = router.calls_to("navigate");
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0].args, vec![json!("workspace")]);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 2. Empty query
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn empty_user_query_yields_empty_page_without_second_fetch() {
    init_tracing();
    let source = Arc::new(StaticPageSource::new(20));
    let collection = Arc::new(Collection::new(Arc::clone(&source)));
    let fragment = collection.cursor("u/42");

    let page = fragment.next().await.unwrap().unwrap();

    assert_eq!(fragment.total_pages(), Some(0));
    assert_eq!(
        serde_json::to_value(&page).unwrap(),
        json!({"number": 0, "count": 0, "num_pages": 0, "results": []})
    );
    assert_eq!(source.fetch_count(), 1);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 3. Wiring
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A panel that lists layers and asks the map to show the first one.
struct Browser {
    proxy: Arc<ObjectProxy>,
    events: EventEmitter,
    table: MethodTable<Browser>,
}

impl Browser {
    fn new(proxy: Arc<ObjectProxy>) -> Self {
        Self {
            proxy,
            events: EventEmitter::new(),
            table: MethodTable::new().with("show_page", Self::show_page),
        }
    }

    fn show_page(&self, args: Args) -> Result<Value, ComponentError> {
        let ids: Vec<String> = args.parse(0)?;
        let first = ids
            .first()
            .ok_or_else(|| ComponentError::InvalidArgs("empty page".into()))?;
        self.proxy.delegate("map", "focus", json!([first]));
        self.events.emit("listed", &json!(ids.len()));
        Ok(json!(ids.len()))
    }
}

impl Component for Browser {
    fn invoke(&self, method: &str, args: Args) -> Result<Value, ComponentError> {
        self.table.invoke(self, method, args)
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }
}

#[tokio::test]
async fn browser_drives_map_through_proxy() {
    init_tracing();
    let proxy = Arc::new(ObjectProxy::new());
    let source = Arc::new(StaticPageSource::new(2).with_query(
        "g/7",
        vec![json!({"id": "l1"}), json!({"id": "l2"}), json!({"id": "l3"})],
    ));
    let layers = Arc::new(Collection::with_config(source, CacheConfig::bounded(8)));
    let browser = Arc::new(Browser::new(Arc::clone(&proxy)));
    proxy.register("layers", &layers).unwrap();
    proxy.register("browser", &browser).unwrap();

    let listed = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&listed);
    proxy.on("browser", "listed", listener(move |n| l.lock().unwrap().push(n.clone())));

    let mut fragment = layers.cursor("g/7");
    fragment.set_current(0);
    let page = fragment.next().await.unwrap().unwrap();
    let ids: Vec<Value> = page.ids().map(|id| json!(id.as_str())).collect();

    let counted = Arc::new(Mutex::new(None));
    let c = Arc::clone(&counted);
    assert!(proxy.delegate_with(
        "browser",
        "show_page",
        json!([ids]),
        Some(reply(move |v| *c.lock().unwrap() = Some(v))),
    ));
    assert_eq!(*counted.lock().unwrap(), Some(json!(2)));
    assert_eq!(*listed.lock().unwrap(), vec![json!(2)]);

    // The map registers last and still receives the focus request.
    assert_eq!(proxy.pending("map").calls, 1);
    let map = Arc::new(RecordingComponent::new());
    proxy.register("map", &map).unwrap();
    assert_eq!(map.calls_to("focus")[0].args, vec![json!("l1")]);

    // The layers collection answers by name too.
    assert_eq!(proxy.call("layers", "len", Value::Null).unwrap(), json!(2));
}
