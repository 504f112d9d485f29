#![deny(missing_docs)]
//! REST page source for waend paged queries.
//!
//! Implements [`PageSource`] against the paging endpoints of a waend API
//! server. A page of query `q` for model `m` is read from
//! `GET {base}/{m}/{q}?page={n}&{params…}` and answers with
//! `{number, count, num_pages, results}`. A single item is read from
//! `GET {base}/{m}/{id}`, with the id percent-encoded as one path segment.

mod error;

use async_trait::async_trait;
use error::{map_http_status, map_reqwest_error};
use waend_types::{FetchError, ItemId, PageRequest, PageSource, RawPage};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Join URL segments, trimming slashes at each segment's edges and skipping
/// empty segments.
fn make_path(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Page source backed by a waend REST endpoint for one model.
///
/// # Example
///
/// ```no_run
/// use waend_source_http::HttpPageSource;
///
/// let groups = HttpPageSource::new("group").base_url("https://waend.example/api/v1");
/// ```
pub struct HttpPageSource {
    base_url: String,
    model_name: String,
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Create a source for `model_name` (e.g. `group`, `layer`) against the
    /// default base URL.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model_name: model_name.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, headers).
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// URL a page request is sent to, without its query string.
    pub fn page_url(&self, request: &PageRequest) -> String {
        make_path(&[
            self.base_url.as_str(),
            self.model_name.as_str(),
            request.query_name.as_str(),
        ])
    }

    /// URL a single item is read from. The id is always a single path
    /// segment, so `/`, `?` and `#` in it are percent-encoded.
    pub fn item_url(&self, id: &ItemId) -> Result<reqwest::Url, FetchError> {
        let base = make_path(&[self.base_url.as_str(), self.model_name.as_str()]);
        let mut url = reqwest::Url::parse(&base)
            .map_err(|e| FetchError::Other(format!("invalid base URL {base}: {e}").into()))?;
        url.path_segments_mut()
            .map_err(|()| FetchError::Other(format!("base URL cannot hold a path: {base}").into()))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, request: &PageRequest) -> Result<RawPage, FetchError> {
        let url = self.page_url(request);
        let mut query: Vec<(&str, String)> = request
            .params
            .iter()
            .filter(|(key, _)| key.as_str() != "page")
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect();
        query.push(("page", request.page.to_string()));

        tracing::debug!(url = %url, page = request.page, "waend.http.fetch");
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }

        response.json::<RawPage>().await.map_err(map_reqwest_error)
    }

    async fn fetch_item(&self, id: &ItemId) -> Result<Option<serde_json::Value>, FetchError> {
        let url = self.item_url(id)?;
        tracing::debug!(url = %url, "waend.http.fetch_item");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map(Some)
            .map_err(map_reqwest_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_path_trims_and_joins() {
        assert_eq!(
            make_path(&["http://host/api/", "/group/", "u/42"]),
            "http://host/api/group/u/42"
        );
        assert_eq!(make_path(&["http://host", "", "layer"]), "http://host/layer");
    }

    #[test]
    fn page_url_ignores_page_number() {
        let source = HttpPageSource::new("group").base_url("http://host/api/v1/");
        let url = source.page_url(&PageRequest::new("u/42", 3));
        assert_eq!(url, "http://host/api/v1/group/u/42");
    }

    #[test]
    fn item_url_uses_model_and_id() {
        let source = HttpPageSource::new("layer").base_url("http://host");
        let url = source.item_url(&ItemId::new("7")).unwrap();
        assert_eq!(url.as_str(), "http://host/layer/7");
    }

    #[test]
    fn item_url_encodes_reserved_characters_in_ids() {
        let source = HttpPageSource::new("layer").base_url("http://host/api/v1/");
        let url = source.item_url(&ItemId::new("a/b?c#d")).unwrap();
        assert_eq!(url.as_str(), "http://host/api/v1/layer/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn item_url_rejects_unparseable_base() {
        let source = HttpPageSource::new("layer").base_url("not a url");
        assert!(source.item_url(&ItemId::new("7")).is_err());
    }
}
