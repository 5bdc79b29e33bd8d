//! Turning free-text model output into a [`BotAction`].
//!
//! The model answers in one of two shapes:
//!
//! ```text
//! Thought: Do I need to use a tool? Yes
//! Action: browser
//! Action Input: https://example.com
//! ```
//!
//! or
//!
//! ```text
//! Thought: Do I need to use a tool? No
//! AI: The page says hello.
//! ```
//!
//! The final-answer marker wins whenever it appears anywhere in the text.

use std::sync::LazyLock;

use regex::Regex;

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Action: (.*?)[\n]*Action Input: (.*)").expect("valid action regex")
});

/// What the model asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    /// The model gave its final answer.
    Finish(String),
    /// The model wants `tool` run on `input`.
    Invoke { tool: String, input: String },
}

/// Model output that is neither a final answer nor a tool request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not parse model output: `{output}`")]
pub struct ParseError {
    pub output: String,
}

/// Parser for one speaker label.
#[derive(Debug, Clone)]
pub struct OutputParser {
    marker: String,
}

impl OutputParser {
    /// Create a parser whose final-answer marker is `"{ai_prefix}:"`.
    pub fn new(ai_prefix: &str) -> Self {
        Self {
            marker: format!("{ai_prefix}:"),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Parse one completion.
    ///
    /// ```
    /// use parley::bot::{BotAction, OutputParser};
    ///
    /// let parser = OutputParser::new("AI");
    /// let action = parser.parse("Action: search\nAction Input: \"rust\"").unwrap();
    /// assert_eq!(action, BotAction::Invoke { tool: "search".into(), input: "rust".into() });
    /// assert_eq!(parser.parse("AI: done").unwrap(), BotAction::Finish("done".into()));
    /// assert!(parser.parse("I am not sure.").is_err());
    /// ```
    pub fn parse(&self, text: &str) -> Result<BotAction, ParseError> {
        if let Some((_, answer)) = text.rsplit_once(self.marker.as_str()) {
            return Ok(BotAction::Finish(answer.trim().to_string()));
        }

        let caps = ACTION.captures(text).ok_or_else(|| ParseError {
            output: text.to_string(),
        })?;
        let tool = caps[1].trim().to_string();
        let input = caps[2].trim().trim_matches('"').to_string();
        Ok(BotAction::Invoke { tool, input })
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new("AI")
    }
}
