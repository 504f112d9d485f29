//! Protocol-level tests: the traits are implementable and usable as objects.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use waend_types::{
    Args, Component, ComponentError, EventEmitter, FetchError, ItemId, MethodTable, PageRequest,
    PageSource, RawPage, listener,
};

// --- Component through a method table ---

struct Layer {
    name: Mutex<String>,
    events: EventEmitter,
}

fn rename(layer: &Layer, args: Args) -> Result<Value, ComponentError> {
    let name: String = args.parse(0)?;
    *layer.name.lock().unwrap() = name.clone();
    layer.events.emit("renamed", &json!(name));
    Ok(Value::Null)
}

fn name(layer: &Layer, _args: Args) -> Result<Value, ComponentError> {
    Ok(json!(*layer.name.lock().unwrap()))
}

struct LayerComponent {
    layer: Layer,
    table: MethodTable<Layer>,
}

impl LayerComponent {
    fn new() -> Self {
        Self {
            layer: Layer {
                name: Mutex::new("untitled".into()),
                events: EventEmitter::new(),
            },
            table: MethodTable::new().with("rename", rename).with("name", name),
        }
    }
}

impl Component for LayerComponent {
    fn invoke(&self, method: &str, args: Args) -> Result<Value, ComponentError> {
        self.table.invoke(&self.layer, method, args)
    }

    fn events(&self) -> &EventEmitter {
        &self.layer.events
    }
}

#[test]
fn component_is_object_safe_and_dispatches() {
    let component: Arc<dyn Component> = Arc::new(LayerComponent::new());

    component.invoke("rename", "rivers".into()).unwrap();
    let out = component.invoke("name", Args::none()).unwrap();
    assert_eq!(out, json!("rivers"));
}

#[test]
fn component_events_follow_on_and_off() {
    let component = LayerComponent::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let l = listener(move |_| {
        h.fetch_add(1, Ordering::SeqCst);
    });

    component.on("renamed", Arc::clone(&l));
    component.invoke("rename", "a".into()).unwrap();
    assert!(component.off("renamed", &l));
    component.invoke("rename", "b".into()).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_method_surfaces_as_error() {
    let component = LayerComponent::new();
    let err = component.invoke("delete", Args::none()).unwrap_err();
    assert!(err.to_string().contains("method not found"));
}

// --- PageSource defaults ---

struct OnePage;

#[async_trait]
impl PageSource for OnePage {
    async fn fetch(&self, request: &PageRequest) -> Result<RawPage, FetchError> {
        Ok(RawPage {
            number: request.page,
            count: 1,
            num_pages: 1,
            results: vec![json!({"id": 1})],
        })
    }
}

#[tokio::test]
async fn page_source_is_object_safe() {
    let source: Arc<dyn PageSource> = Arc::new(OnePage);
    let page = source
        .fetch(&PageRequest::new("g/1", 1).param("kind", "layer"))
        .await
        .unwrap();
    assert_eq!(page.number, 1);
    assert_eq!(page.results.len(), 1);
}

#[tokio::test]
async fn default_fetch_item_finds_nothing() {
    let source = OnePage;
    let item = source.fetch_item(&ItemId::new("1")).await.unwrap();
    assert!(item.is_none());
}
