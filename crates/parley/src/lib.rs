//! A conversational bot that drives a text-completion model through a
//! Thought / Action / Observation loop.
//!
//! `parley` sends a rendered prompt to a language model, reads the free-text
//! completion, and decides between two outcomes: the model gave its final
//! answer, or it asked for a tool. Tool output is appended to the running
//! transcript (the scratchpad) as an observation and the model is asked
//! again, until it answers or the turn limit is reached.
//!
//! # Getting started
//!
//! ```ignore
//! use parley::prelude::*;
//!
//! fn main() -> Result<(), String> {
//!     let api_key = std::env::var("OPENROUTER_KEY").map_err(|e| e.to_string())?;
//!     let client = OpenRouterClient::new(api_key)?;
//!
//!     let tools = ToolSet::new().with(BrowserTool::new());
//!     let config = BotConfig::default().with_max_turns(8);
//!
//!     let mut bot = ChatBot::new(&client, &tools, config).with_event_handler(&LoggingHandler);
//!     let result = bot.chat("What is on https://example.com?").map_err(|e| e.to_string())?;
//!     println!("{}", result.output);
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **The loop:** [`ChatBot`](bot::ChatBot) and [`BotConfig`](bot::BotConfig).
//! - **Parsing model output:** [`OutputParser`](bot::OutputParser) and
//!   [`BotAction`](bot::BotAction).
//! - **Tools:** the [`Tool`](tools::Tool) trait, [`ToolSet`](tools::ToolSet)
//!   for dispatch, [`FnTool`](tools::FnTool) for closures, and the built-in
//!   [`BrowserTool`](tools::BrowserTool) and search tools.
//! - **Observing a run:** implement [`EventHandler`](bot::EventHandler) or use
//!   [`LoggingHandler`](bot::LoggingHandler).
//! - **Models:** the [`LanguageModel`](llm::LanguageModel) trait,
//!   [`OpenRouterClient`] for the hosted API, and
//!   [`ScriptedModel`](llm::ScriptedModel) for tests.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bot`] | Chat bot loop, output parser, scratchpad, history, prompt, events |
//! | [`tools`] | [`Tool`](tools::Tool) trait, [`ToolSet`](tools::ToolSet), search and browser tools, registry |
//! | [`llm`] | [`LanguageModel`](llm::LanguageModel) trait and scripted model |
//! | [`config`] | [`AppConfig`](config::AppConfig) for the `parley` binary |

pub mod bot;
pub mod config;
pub mod llm;
pub mod prelude;
pub mod tools;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::llm::LanguageModel;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for completions.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default completion length for a single bot turn.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body. Optional fields are omitted from
/// serialization when unset.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation. The whole prompt travels as one
/// user message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`OpenRouterClient::chat`].
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<UsageInfo>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Blocking HTTP client for an OpenAI-compatible chat completions endpoint
/// (OpenRouter by default).
///
/// As a [`LanguageModel`] it sends the whole prompt as a single user message
/// and returns the first choice's text.
pub struct OpenRouterClient {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenRouterClient {
    /// Create a client for the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("parley/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: OPENROUTER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
        })
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Send a chat completion request.
    pub fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, String> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("completion API HTTP {status}: {text}"));
        }

        parse_chat_response(&text)
    }
}

/// Decode a chat completion response body.
fn parse_chat_response(text: &str) -> Result<ChatCompletion, String> {
    let parsed: RawChatResponse =
        serde_json::from_str(text).map_err(|e| format!("failed to parse response: {e}"))?;

    if let Some(err) = parsed.error {
        return Err(format!("completion API error: {}", err.message));
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    let content = parsed
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message.content);
    Ok(ChatCompletion {
        content,
        usage: parsed.usage,
    })
}

impl LanguageModel for OpenRouterClient {
    fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stop: if stop.is_empty() {
                None
            } else {
                Some(stop.to_vec())
            },
        };
        let completion = self.chat(&body)?;
        completion
            .content
            .ok_or_else(|| "empty completion (no choices or no content)".to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_serializes_with_lowercase_role() {
        let user = Message::user("world");
        assert_eq!(user.role, MessageRole::User);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "world");
    }

    #[test]
    fn chat_request_skips_unset_stop() {
        let req = ChatRequest {
            model: "test-model".into(),
            messages: vec![Message::user("hi")],
            max_tokens: 100,
            temperature: 0.5,
            stop: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("stop").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn chat_request_serializes_stop_sequences() {
        let req = ChatRequest {
            model: "m".into(),
            stop: Some(vec!["\nObservation:".into()]),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["stop"][0], "\nObservation:");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn parse_response_extracts_first_choice() {
        let body = r#"{
            "choices": [{"message": {"content": "AI: hi"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.content.as_deref(), Some("AI: hi"));
        assert_eq!(completion.usage.unwrap().total_tokens, Some(5));
    }

    #[test]
    fn parse_response_surfaces_api_error() {
        let body = r#"{"error": {"message": "invalid key"}}"#;
        let err = parse_chat_response(body).unwrap_err();
        assert!(err.contains("invalid key"));
    }

    #[test]
    fn parse_response_without_choices_is_empty() {
        let completion = parse_chat_response("{}").unwrap();
        assert!(completion.content.is_none());
    }

    #[test]
    fn parse_response_ignores_unread_choice_fields() {
        let body = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "AI: ok"}, "finish_reason": "length", "logprobs": null}]}"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.content.as_deref(), Some("AI: ok"));
        assert!(completion.usage.is_none());
    }

    #[test]
    fn client_builder_sets_model_and_endpoint() {
        let client = OpenRouterClient::new("key")
            .unwrap()
            .with_model("some/model")
            .with_endpoint("http://localhost:9/v1/chat/completions");
        assert_eq!(client.model_name(), "some/model");
        assert!(format!("{client:?}").contains("localhost:9"));
    }
}
