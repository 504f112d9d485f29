//! # waend-types — Protocol types for the waend core
//!
//! This crate defines the two seams the rest of the workspace composes over,
//! plus the value types that travel across them.
//!
//! ## The Seams
//!
//! | Seam | Trait | What it does |
//! |------|-------|-------------|
//! | ① Components | [`Component`] | A named object whose methods and events are reachable by name |
//! | ② Paging | [`PageSource`] | Fetches one page of a remote paginated query |
//!
//! ## Supporting Types
//!
//! | Concern | Types |
//! |---------|-------|
//! | Identity | [`ComponentName`], [`QueryName`], [`ItemId`] |
//! | Events | [`EventEmitter`], [`Listener`] |
//! | Dispatch | [`Args`], [`MethodTable`] |
//! | Pages | [`PageRequest`], [`RawPage`], [`Page`], [`Item`] |
//! | Errors | [`ComponentError`], [`ProxyError`], [`FetchError`], [`FragmentError`] |
//!
//! ## Dependency Notes
//!
//! Method arguments, event payloads, and item properties are
//! `serde_json::Value`. The paging endpoint speaks JSON, and components are
//! addressed dynamically by name, so a single self-describing value type
//! keeps [`Component`] object-safe without generic plumbing.

#![deny(missing_docs)]

pub mod component;
pub mod error;
pub mod event;
pub mod id;
pub mod page;
pub mod source;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use component::{Args, Component, Method, MethodTable};
pub use error::{ComponentError, FetchError, FragmentError, ProxyError};
pub use event::{EventEmitter, Listener, listener};
pub use id::{ComponentName, ItemId, QueryName};
pub use page::{Item, Page, PageRequest, RawPage};
pub use source::PageSource;
