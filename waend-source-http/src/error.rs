//! Internal error helpers for mapping HTTP/reqwest errors to [`FetchError`].

use waend_types::FetchError;

/// Map a non-success HTTP status to a [`FetchError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> FetchError {
    FetchError::Status {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] to a [`FetchError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_decode() {
        FetchError::Decode(err.to_string())
    } else if err.is_timeout() || err.is_connect() || err.is_request() {
        FetchError::Transport(err.to_string())
    } else {
        FetchError::Other(Box::new(err))
    }
}
