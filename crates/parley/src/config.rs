//! Settings for the `parley` binary.
//!
//! [`AppConfig`] is read from an optional JSON file, then command-line
//! flags are laid over it with [`apply`](AppConfig::apply). It converts into
//! library types via [`build_bot_config`](AppConfig::build_bot_config),
//! [`build_client`](AppConfig::build_client) and
//! [`build_tool_set`](AppConfig::build_tool_set).
//!
//! Secrets never live in the file: the completion key comes from
//! `OPENROUTER_KEY`, search credentials from `GOOGLE_API_KEY` and
//! `GOOGLE_CSE_ID`.
//!
//! ```json
//! {
//!   "model": "openai/gpt-4o-mini",
//!   "max_turns": 8,
//!   "tools": ["browser", "google-search"]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bot::{BotConfig, DEFAULT_MAX_TURNS};
use crate::tools::names::BROWSER_KEY;
use crate::tools::search::DEFAULT_NUM_RESULTS;
use crate::tools::{DEFAULT_MAX_RESULT_BYTES, ToolRegistry, ToolSet};
use crate::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OPENROUTER_URL, OpenRouterClient};

/// Configuration for a `parley` session. Every field has a default, so an
/// empty JSON object is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Model identifier. Default: `"openai/gpt-4o-mini"`.
    pub model: String,
    /// Chat completions URL. Default: OpenRouter.
    pub endpoint: String,
    /// Model calls per input. Default: `15`.
    pub max_turns: u32,
    /// Maximum tokens per completion. Default: `512`.
    pub max_tokens: u32,
    /// Sampling temperature. Default: `0.0`.
    pub temperature: f32,
    /// Bot speaker label. Default: `"AI"`.
    pub ai_prefix: String,
    /// User speaker label. Default: `"Human"`.
    pub human_prefix: String,
    /// Registry keys of the tools to load. Default: `["browser"]`.
    pub tools: Vec<String>,
    /// Tool output size cap in bytes. Default: `8000`.
    pub max_result_bytes: usize,
    /// Results returned by `google-search-json`. Default: `3`.
    pub search_results: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: OPENROUTER_URL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            ai_prefix: "AI".to_string(),
            human_prefix: "Human".to_string(),
            tools: vec![BROWSER_KEY.to_string()],
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            search_results: DEFAULT_NUM_RESULTS,
        }
    }
}

/// Values given on the command line. `None` keeps the file or default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub tools: Option<Vec<String>>,
    pub max_turns: Option<u32>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl AppConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file '{}': {e}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("failed to parse config file '{}': {e}", path.display()))
    }

    /// Read `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Lay command-line values over this config.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(tools) = overrides.tools {
            self.tools = tools;
        }
        if let Some(max_turns) = overrides.max_turns {
            self.max_turns = max_turns;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = temperature;
        }
        self
    }

    /// Reject values the bot cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_turns == 0 {
            return Err("max_turns must be at least 1".into());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.ai_prefix.trim().is_empty() || self.human_prefix.trim().is_empty() {
            return Err("ai_prefix and human_prefix must not be empty".into());
        }
        Ok(())
    }

    pub fn build_bot_config(&self) -> BotConfig {
        BotConfig::default()
            .with_ai_prefix(self.ai_prefix.clone())
            .with_human_prefix(self.human_prefix.clone())
            .with_max_turns(self.max_turns)
    }

    /// Build the completion client with the given API key.
    pub fn build_client(&self, api_key: impl Into<String>) -> Result<OpenRouterClient, String> {
        Ok(OpenRouterClient::new(api_key)?
            .with_endpoint(self.endpoint.clone())
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature))
    }

    /// Build the configured tools.
    pub fn build_tool_set(&self) -> Result<ToolSet, String> {
        self.tool_registry().build(&self.tools)
    }

    pub fn tool_registry(&self) -> ToolRegistry {
        ToolRegistry::new()
            .with_max_result_bytes(self.max_result_bytes)
            .with_search_results(self.search_results)
    }
}
