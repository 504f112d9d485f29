//! Error types for each seam.

use thiserror::Error;

/// Errors raised by a component while handling a method call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ComponentError {
    /// The component has no method with this name.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// The arguments did not match what the method expects.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// The method ran and failed.
    #[error("method failed: {0}")]
    Failed(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Object proxy errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A live component is already registered under this name.
    #[error("name already registered: {0}")]
    AlreadyRegistered(String),

    /// No live component is registered under this name.
    #[error("name not registered: {0}")]
    NotRegistered(String),

    /// The target component rejected or failed the call.
    #[error("dispatch to {component}.{method} failed: {source}")]
    Dispatch {
        /// Name the call was addressed to.
        component: String,
        /// Method that was invoked.
        method: String,
        /// The component's own error.
        #[source]
        source: ComponentError,
    },
}

/// Errors from a [`PageSource`](crate::PageSource).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body was not a valid page.
    #[error("decode error: {0}")]
    Decode(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// Whether repeating the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Paginated cursor errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FragmentError {
    /// Fetching a page failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The initial page-count request failed; the cursor never became ready.
    #[error("cursor initialization failed: {0}")]
    Init(String),

    /// The task driving initialization went away without reporting.
    #[error("cursor initialization was abandoned")]
    Closed,
}
