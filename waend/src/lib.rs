#![deny(missing_docs)]
//! # waend — umbrella crate
//!
//! Single import surface for the waend core: the protocol types, the
//! named component proxy, and paginated cursors, with the REST page source
//! behind a feature flag. The `prelude` covers the happy path.

pub use waend_types;
#[cfg(feature = "fragment")]
pub use waend_fragment;
#[cfg(feature = "proxy")]
pub use waend_proxy;
#[cfg(feature = "source-http")]
pub use waend_source_http;

/// Happy-path imports for wiring components and cursors.
pub mod prelude {
    pub use waend_types::{
        Args, Component, ComponentError, ComponentName, EventEmitter, FetchError, FragmentError,
        Item, ItemId, Listener, MethodTable, Page, PageRequest, PageSource, ProxyError, QueryName,
        RawPage, listener,
    };

    #[cfg(feature = "proxy")]
    pub use waend_proxy::{ObjectProxy, Reply, reply};

    #[cfg(feature = "fragment")]
    pub use waend_fragment::{CacheConfig, Collection, Fragment, Totals};

    #[cfg(feature = "source-http")]
    pub use waend_source_http::HttpPageSource;
}
