//! Canonical tool name constants.
//!
//! Tool names are what the model writes after `Action:`; registry keys are
//! what configuration files and `--tool` flags use to select tools.

pub const BROWSER: &str = "browser";
pub const GOOGLE_SEARCH: &str = "Google Search";
pub const GOOGLE_SEARCH_JSON: &str = "Google Search Results JSON";

/// Registry key for [`BROWSER`].
pub const BROWSER_KEY: &str = "browser";
/// Registry key for [`GOOGLE_SEARCH`].
pub const GOOGLE_SEARCH_KEY: &str = "google-search";
/// Registry key for [`GOOGLE_SEARCH_JSON`].
pub const GOOGLE_SEARCH_JSON_KEY: &str = "google-search-json";
