//! Build a [`ToolSet`] from tool names given in configuration.

use tracing::debug;

use crate::tools::browser::BrowserTool;
use crate::tools::core::{DEFAULT_MAX_RESULT_BYTES, ToolSet};
use crate::tools::names::{BROWSER_KEY, GOOGLE_SEARCH_JSON_KEY, GOOGLE_SEARCH_KEY};
use crate::tools::search::{DEFAULT_NUM_RESULTS, GoogleSearch, GoogleSearchResults, SearchApiWrapper};

/// Registry keys accepted by [`ToolRegistry::build`].
pub const AVAILABLE_TOOLS: &[&str] = &[BROWSER_KEY, GOOGLE_SEARCH_KEY, GOOGLE_SEARCH_JSON_KEY];

/// Creates tools by registry key.
///
/// Search tools need a [`SearchApiWrapper`]; unless one is supplied with
/// [`with_search_api`](Self::with_search_api), it is read from the
/// environment the first time a search tool is requested.
#[derive(Debug)]
pub struct ToolRegistry {
    max_result_bytes: usize,
    search_results: u32,
    search_api: Option<SearchApiWrapper>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            search_results: DEFAULT_NUM_RESULTS,
            search_api: None,
        }
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_result_bytes(mut self, max: usize) -> Self {
        self.max_result_bytes = max;
        self
    }

    /// Number of results returned by `google-search-json`.
    pub fn with_search_results(mut self, n: u32) -> Self {
        self.search_results = n;
        self
    }

    pub fn with_search_api(mut self, api: SearchApiWrapper) -> Self {
        self.search_api = Some(api);
        self
    }

    /// Create the named tools in order. Unknown keys, duplicates, and
    /// missing search credentials are errors.
    pub fn build(&self, names: &[String]) -> Result<ToolSet, String> {
        let mut set = ToolSet::new().with_max_result_bytes(self.max_result_bytes);
        let mut search_api = self.search_api.clone();

        for name in names {
            match name.as_str() {
                BROWSER_KEY => set.register(BrowserTool::new())?,
                GOOGLE_SEARCH_KEY => {
                    let api = resolve_search_api(&mut search_api)?;
                    set.register(GoogleSearch::new(api))?;
                }
                GOOGLE_SEARCH_JSON_KEY => {
                    let api = resolve_search_api(&mut search_api)?;
                    set.register(GoogleSearchResults::new(api).num_results(self.search_results))?;
                }
                other => {
                    return Err(format!(
                        "unknown tool '{other}' (available: {})",
                        AVAILABLE_TOOLS.join(", ")
                    ));
                }
            }
        }

        debug!("Loaded tools: {:?}", set.names());
        Ok(set)
    }
}

fn resolve_search_api(slot: &mut Option<SearchApiWrapper>) -> Result<SearchApiWrapper, String> {
    if let Some(api) = slot {
        return Ok(api.clone());
    }
    let api = SearchApiWrapper::from_env()
        .map_err(|e| format!("search tools need Google credentials: {e}"))?;
    *slot = Some(api.clone());
    Ok(api)
}

/// Build a tool set from registry keys with default search settings.
pub fn load_tools(names: &[String], max_result_bytes: usize) -> Result<ToolSet, String> {
    ToolRegistry::new()
        .with_max_result_bytes(max_result_bytes)
        .build(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new().with_search_api(SearchApiWrapper::new("key", "cx").unwrap())
    }

    #[test]
    fn builds_tools_in_order() {
        let set = registry()
            .build(&keys(&["google-search-json", "browser", "google-search"]))
            .unwrap();
        assert_eq!(
            set.names(),
            vec!["Google Search Results JSON", "browser", "Google Search"]
        );
    }

    #[test]
    fn empty_list_gives_empty_set() {
        assert!(registry().build(&[]).unwrap().is_empty());
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = registry().build(&keys(&["calculator"])).unwrap_err();
        assert!(err.contains("unknown tool 'calculator'"));
        assert!(err.contains("google-search-json"));
    }

    #[test]
    fn duplicate_tool_is_rejected() {
        let err = load_tools(&keys(&["browser", "browser"]), 100).unwrap_err();
        assert!(err.contains("duplicate tool name 'browser'"));
    }

    #[test]
    fn load_tools_builds_browser() {
        let set = load_tools(&keys(&["browser"]), 1_000).unwrap();
        assert_eq!(set.names(), vec!["browser"]);
    }
}
