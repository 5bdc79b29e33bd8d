//! Web search through the Google Custom Search JSON API.
//!
//! [`SearchApiWrapper`] owns the credentials and the HTTP client. Two tools
//! sit on top of it:
//!
//! | Tool | Name | Output |
//! |------|------|--------|
//! | [`GoogleSearch`] | `Google Search` | Result snippets joined into one paragraph |
//! | [`GoogleSearchResults`] | `Google Search Results JSON` | JSON array of `{title, link, snippet}` |
//!
//! Credentials come from `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::tools::core::{Tool, ToolError};
use crate::tools::names::{GOOGLE_SEARCH, GOOGLE_SEARCH_JSON};

pub const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Observation used when a query returns nothing.
pub const NO_RESULT: &str = "No good Google Search Result was found";

/// Results fetched by [`SearchApiWrapper::run`]. The API caps a page at 10.
pub const DEFAULT_K: u32 = 10;

/// Results returned by [`GoogleSearchResults`].
pub const DEFAULT_NUM_RESULTS: u32 = 3;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

// ── SearchApiWrapper ───────────────────────────────────────────────

/// Blocking client for the Custom Search API.
#[derive(Clone)]
pub struct SearchApiWrapper {
    client: reqwest::blocking::Client,
    api_key: String,
    cse_id: String,
    endpoint: String,
    k: u32,
}

impl std::fmt::Debug for SearchApiWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchApiWrapper")
            .field("endpoint", &self.endpoint)
            .field("cse_id", &self.cse_id)
            .field("k", &self.k)
            .finish()
    }
}

impl SearchApiWrapper {
    pub fn new(api_key: impl Into<String>, cse_id: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            cse_id: cse_id.into(),
            endpoint: GOOGLE_SEARCH_URL.to_string(),
            k: DEFAULT_K,
        })
    }

    /// Read `GOOGLE_API_KEY` and `GOOGLE_CSE_ID` from the environment.
    pub fn from_env() -> Result<Self, String> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| "GOOGLE_API_KEY environment variable is not set".to_string())?;
        let cse_id = std::env::var("GOOGLE_CSE_ID")
            .map_err(|_| "GOOGLE_CSE_ID environment variable is not set".to_string())?;
        Self::new(api_key, cse_id)
    }

    /// Override the API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Number of results [`run`](Self::run) draws snippets from (1–10).
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k.clamp(1, 10);
        self
    }

    /// Search and return the hits' snippets joined by spaces, or
    /// [`NO_RESULT`] when there are no hits.
    pub fn run(&self, query: &str) -> Result<String, String> {
        let body = self.search(query, self.k)?;
        Ok(collect_snippets(&body).unwrap_or_else(|| NO_RESULT.to_string()))
    }

    /// Search and return up to `num_results` structured hits.
    pub fn results(&self, query: &str, num_results: u32) -> Result<Vec<SearchResult>, String> {
        let body = self.search(query, num_results.clamp(1, 10))?;
        Ok(parse_search_items(&body))
    }

    fn search(&self, query: &str, num: u32) -> Result<serde_json::Value, String> {
        let url = format!(
            "{}?key={}&cx={}&q={}&num={num}",
            self.endpoint,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.cse_id),
            urlencoding::encode(query),
        );
        debug!("search request: q={query:?}, num={num}");

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| format!("search request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(format!("search API HTTP {status}: {body}"));
        }

        resp.json()
            .map_err(|e| format!("failed to parse search response: {e}"))
    }
}

/// Join the snippet of every item in a Custom Search response body with
/// spaces. Items lacking a snippet contribute nothing. `None` when the body
/// has no items.
pub fn collect_snippets(body: &serde_json::Value) -> Option<String> {
    let items = body["items"].as_array().filter(|items| !items.is_empty())?;
    let snippets: Vec<&str> = items
        .iter()
        .filter_map(|item| item["snippet"].as_str())
        .collect();
    Some(snippets.join(" "))
}

/// Extract hits from a Custom Search response body. Items without a title
/// or link are skipped.
pub fn parse_search_items(body: &serde_json::Value) -> Vec<SearchResult> {
    let Some(items) = body["items"].as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            Some(SearchResult {
                title: item["title"].as_str()?.to_string(),
                link: item["link"].as_str()?.to_string(),
                snippet: item["snippet"].as_str().map(str::to_string),
            })
        })
        .collect()
}

// ── Tools ──────────────────────────────────────────────────────────

/// Search the web and answer with a paragraph of result snippets.
#[derive(Debug)]
pub struct GoogleSearch {
    api: SearchApiWrapper,
}

impl GoogleSearch {
    pub fn new(api: SearchApiWrapper) -> Self {
        Self { api }
    }
}

impl Tool for GoogleSearch {
    fn name(&self) -> &str {
        GOOGLE_SEARCH
    }

    fn description(&self) -> &str {
        "A wrapper around Google Search. Useful for when you need to answer questions \
         about current events. Input should be a search query."
    }

    fn run(&self, input: &str) -> Result<String, ToolError> {
        self.api.run(input).map_err(ToolError::Failed)
    }
}

/// Search the web and answer with the top results as a JSON array.
#[derive(Debug)]
pub struct GoogleSearchResults {
    api: SearchApiWrapper,
    num_results: u32,
}

impl GoogleSearchResults {
    pub fn new(api: SearchApiWrapper) -> Self {
        Self {
            api,
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    pub fn num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results;
        self
    }
}

impl Tool for GoogleSearchResults {
    fn name(&self) -> &str {
        GOOGLE_SEARCH_JSON
    }

    fn description(&self) -> &str {
        "A wrapper around Google Search. Useful for when you need to answer questions \
         about current events. Input should be a search query. Output is a JSON array \
         of the query results."
    }

    fn run(&self, input: &str) -> Result<String, ToolError> {
        let results = self
            .api
            .results(input, self.num_results)
            .map_err(ToolError::Failed)?;
        format_results_json(&results).map_err(ToolError::Failed)
    }
}

/// Render hits as a JSON array; an empty list becomes a single
/// `{"Result": NO_RESULT}` entry.
pub fn format_results_json(results: &[SearchResult]) -> Result<String, String> {
    if results.is_empty() {
        return Ok(serde_json::json!([{ "Result": NO_RESULT }]).to_string());
    }
    serde_json::to_string(results).map_err(|e| format!("failed to encode results: {e}"))
}
