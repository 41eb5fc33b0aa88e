//! Page transport seam
//!
//! The engine never performs I/O itself. When remote mode needs a page it
//! hands out a [`PageRequest`]; whoever drives the select sends it through a
//! [`PageFetcher`] and feeds the parsed body back in. The request carries the
//! epoch it was issued in, so a late answer to an abandoned query can be
//! recognized and dropped.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::pagination::Epoch;

/// Ordered request parameters, built by the `query_params` callback
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`QueryParams::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Replace every value of `key` with a single `value`
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        self.0.retain(|(k, _)| *k != key);
        self.0.push((key, value.to_string()));
    }

    /// Add a value without removing existing ones
    pub fn append(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A page fetch issued by the pagination controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// The query epoch this request belongs to
    pub epoch: Epoch,
    pub url: String,
    pub params: QueryParams,
}

/// Future returned by [`PageFetcher::fetch`]
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'static>>;

/// Capability to fetch one remote page
///
/// Implementations resolve to the parsed response body, or to
/// [`SelectError::Transport`](crate::SelectError::Transport) on failure.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, request: &PageRequest) -> FetchFuture;
}

impl<F> PageFetcher for F
where
    F: Fn(&PageRequest) -> FetchFuture + Send + Sync,
{
    fn fetch(&self, request: &PageRequest) -> FetchFuture {
        (self)(request)
    }
}

/// Fetches pages over HTTP GET, encoding params into the query string
#[cfg(feature = "network")]
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "network")]
impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, headers, proxies)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "network")]
impl PageFetcher for HttpFetcher {
    fn fetch(&self, request: &PageRequest) -> FetchFuture {
        use crate::error::SelectError;

        let builder = self.client.get(&request.url).query(&request.params);
        Box::pin(async move {
            let response = builder
                .send()
                .await
                .map_err(|e| SelectError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                return Err(SelectError::Transport(format!(
                    "HTTP error: {}",
                    response.status()
                )));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| SelectError::Transport(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_set_replaces() {
        let mut params = QueryParams::new().with("q", "jo").with("page", 1);
        params.set("page", 2);
        params.append("tag", "a");
        params.append("tag", "b");

        assert_eq!(params.get("q"), Some("jo"));
        assert_eq!(params.get("page"), Some("2"));
        let tags: Vec<_> = params.iter().filter(|(k, _)| *k == "tag").collect();
        assert_eq!(tags, vec![("tag", "a"), ("tag", "b")]);
    }

    #[test]
    fn test_query_params_serialize_as_pairs() {
        let params = QueryParams::new().with("q", "john").with("page", 3);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!([["q", "john"], ["page", "3"]]));
    }
}
