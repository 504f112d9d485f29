//! Typed ID wrappers for component, query, and item identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers keep component names, query names, and item ids apart.
/// They are plain strings underneath; no format is enforced.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_id!(ComponentName, "Symbolic name a component is registered under.");
typed_id!(QueryName, "Name of a remote paged query, e.g. `u/42`.");
typed_id!(ItemId, "Identifier of an item returned by a paged query.");

impl ItemId {
    /// Read an item id out of a JSON descriptor's `id` field.
    ///
    /// Numeric ids are rendered to their decimal form so `42` and `"42"`
    /// name the same item.
    pub fn from_descriptor(descriptor: &serde_json::Value) -> Option<Self> {
        match descriptor.get("id")? {
            serde_json::Value::String(s) => Some(Self(s.clone())),
            serde_json::Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}
