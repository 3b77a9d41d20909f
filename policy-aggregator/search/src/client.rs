use crate::SearchInput;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// The GraphQL operation served by the search API.
const SEARCH_QUERY: &str = "\
query searchResultItemsAndRelatedItems($input: [SearchInput]) {
  searchResult: search(input: $input) {
    items
    related {
      kind
      items
    }
  }
}";

/// An untyped record returned by the search index.
///
/// Field sets vary by resource kind and scalar values may arrive
/// string-encoded; the accessors normalize both.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SearchItem(pub Map<String, Value>);

/// Related resources grouped by kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SearchRelated {
    pub kind: String,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// The merged result set of one search request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    pub items: Vec<SearchItem>,
    pub related: Vec<SearchRelated>,
}

/// A parameterized, filterable source of search results.
#[async_trait]
pub trait SearchPolicies: Send + Sync + 'static {
    async fn search(&self, input: &[SearchInput]) -> Result<SearchResults>;
}

/// Queries the search API's GraphQL endpoint.
#[derive(Clone)]
pub struct SearchApiClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "searchResult", default)]
    search_result: Vec<SearchResultEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResultEntry {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(default)]
    related: Vec<SearchRelated>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

// === impl SearchItem ===

impl SearchItem {
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn u64_field(&self, key: &str) -> Option<u64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

// === impl SearchResults ===

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.related.is_empty()
    }
}

// === impl SearchApiClient ===

impl SearchApiClient {
    pub fn new(endpoint: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = token {
            let bearer = format!("Bearer {}", token.trim());
            let mut value = reqwest::header::HeaderValue::from_str(&bearer)
                .context("invalid search api authorization header")?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to create search api client")?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchPolicies for SearchApiClient {
    async fn search(&self, input: &[SearchInput]) -> Result<SearchResults> {
        let body = json!({
            "operationName": "searchResultItemsAndRelatedItems",
            "query": SEARCH_QUERY,
            "variables": { "input": input },
        });

        tracing::debug!(clauses = input.len(), "querying search api");
        let rsp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("search api request failed")?;

        let status = rsp.status();
        if !status.is_success() {
            let detail = rsp.text().await.unwrap_or_default();
            bail!("search api returned {status}: {}", truncate(&detail, 256));
        }

        let rsp: GraphqlResponse = rsp
            .json()
            .await
            .context("failed to decode search api response")?;
        if let Some(error) = rsp.errors.first() {
            bail!("search api returned an error: {}", error.message);
        }

        let mut results = SearchResults::default();
        for entry in rsp.data.map(|d| d.search_result).unwrap_or_default() {
            results.items.extend(entry.items);
            results.related.extend(entry.related);
        }
        Ok(results)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
