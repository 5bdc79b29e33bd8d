//! Web page fetching.
//!
//! [`RequestsWrapper`] performs a blocking GET and returns the body text;
//! [`BrowserTool`] exposes it to the bot as the `browser` tool and reduces
//! HTML to readable text with [`filter_text`].

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, error};

use crate::tools::core::{Tool, ToolError};
use crate::tools::names::BROWSER;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; parley/0.1)";

// ── RequestsWrapper ────────────────────────────────────────────────

/// Thin blocking HTTP GET client.
#[derive(Debug, Clone)]
pub struct RequestsWrapper {
    client: reqwest::blocking::Client,
}

impl RequestsWrapper {
    pub fn new() -> Result<Self, String> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self { client })
    }

    /// GET `url` and return the response body. Non-2xx statuses are errors.
    pub fn get(&self, url: &str) -> Result<String, String> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| format!("request to {url} failed: {e}"))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| format!("failed to read body from {url}: {e}"))?;
        if !status.is_success() {
            return Err(format!("HTTP {status} from {url}"));
        }
        Ok(body)
    }
}

// ── BrowserTool ────────────────────────────────────────────────────

/// Fetch a URL and return its readable text.
///
/// Request failures are logged and returned as tool errors, which the
/// [`ToolSet`](crate::tools::ToolSet) hands back to the model as the
/// observation.
#[derive(Debug)]
pub struct BrowserTool {
    requests: Option<RequestsWrapper>,
}

impl BrowserTool {
    /// Create the tool with a default [`RequestsWrapper`]. If the HTTP client
    /// cannot be built, every run reports that failure.
    pub fn new() -> Self {
        match RequestsWrapper::new() {
            Ok(requests) => Self::with_requests(requests),
            Err(e) => {
                error!("[browser] {e}");
                Self { requests: None }
            }
        }
    }

    pub fn with_requests(requests: RequestsWrapper) -> Self {
        Self {
            requests: Some(requests),
        }
    }
}

impl Default for BrowserTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for BrowserTool {
    fn name(&self) -> &str {
        BROWSER
    }

    fn description(&self) -> &str {
        "A portal to the internet. Use this when you need to get specific content from a \
         website. Input should be a url (i.e. https://www.example.com). The output will be \
         the text content of the page."
    }

    fn run(&self, input: &str) -> Result<String, ToolError> {
        let requests = self
            .requests
            .as_ref()
            .ok_or_else(|| ToolError::failed("HTTP client unavailable"))?;
        match requests.get(input.trim()) {
            Ok(html) => {
                let content = filter_text(&html);
                debug!("[browser] output: {} chars", content.len());
                Ok(content)
            }
            Err(e) => {
                error!("[browser] {e}");
                Err(ToolError::Failed(e))
            }
        }
    }
}

// ── HTML filtering ─────────────────────────────────────────────────

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<head\b.*?</head\s*>|<!--.*?-->",
    )
    .expect("valid hidden-block regex")
});

static BLOCK_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(p|div|br|li|ul|ol|tr|table|section|article|header|footer|h[1-6])\b[^>]*>")
        .expect("valid block-tag regex")
});

// A bare `<` (as in `a < b`) is text, not a tag.
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?[A-Za-z!][^>]*>").expect("valid tag regex"));

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid entity regex"));

/// Reduce an HTML document to readable text.
///
/// Scripts, styles, the document head, and comments are dropped, block-level
/// tags become line breaks, the remaining tags are removed, common entities
/// are decoded, and whitespace is collapsed. A `<` that does not open a tag
/// is kept, so comparisons and plain text survive.
pub fn filter_text(html: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(html, " ");
    let text = BLOCK_TAGS.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, " ");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(s: &str) -> String {
    let s = NUMERIC_ENTITY.replace_all(s, |caps: &regex::Captures| {
        let code = &caps[1];
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
