//! Language-model abstraction used by the bot loop.
//!
//! The [`ChatBot`](crate::bot::ChatBot) only needs "text in, text out": a
//! rendered prompt goes in, the model's continuation comes back, cut at the
//! first stop sequence. [`LanguageModel`] captures exactly that, so the loop
//! can run against the hosted [`OpenRouterClient`](crate::OpenRouterClient)
//! or against a [`ScriptedModel`] in tests and demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

/// A text-completion model.
///
/// Implementations block until the completion is available. Errors are
/// returned as human-readable strings; the bot wraps them in
/// [`BotError::Model`](crate::bot::BotError::Model).
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt`, stopping before any of the `stop` sequences.
    fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, String>;

    /// Identifier used in logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// A model that replays canned completions in order.
///
/// Every prompt and stop list it receives is recorded so callers can inspect
/// what the bot actually sent. Once the script is exhausted, `complete` returns an error.
///
/// ```
/// use parley::llm::{LanguageModel, ScriptedModel};
///
/// let model = ScriptedModel::new(["AI: hello"]);
/// assert_eq!(model.complete("hi", &[]).unwrap(), "AI: hello");
/// assert!(model.complete("again", &[]).is_err());
/// assert_eq!(model.prompts(), vec!["hi".to_string(), "again".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    stops: Mutex<Vec<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
        }
    }

    /// Queue another completion at the end of the script.
    pub fn push(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response.into());
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Stop sequences received with each prompt.
    pub fn stops(&self) -> Vec<Vec<String>> {
        self.stops.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of completions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        self.stops
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(stop.to_vec());
        let next = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        debug!("scripted completion: {}", next.is_some());
        next.ok_or_else(|| "scripted model has no completions left".to_string())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_order_and_records_prompts() {
        let model = ScriptedModel::new(["one", "two"]);
        assert_eq!(model.remaining(), 2);
        assert_eq!(model.complete("p1", &[]).unwrap(), "one");
        assert_eq!(model.complete("p2", &[]).unwrap(), "two");
        assert_eq!(model.remaining(), 0);
        assert_eq!(model.prompts(), vec!["p1", "p2"]);
    }

    #[test]
    fn exhausted_script_is_an_error() {
        let model = ScriptedModel::default();
        let err = model.complete("p", &[]).unwrap_err();
        assert!(err.contains("no completions left"));
    }

    #[test]
    fn push_extends_script() {
        let model = ScriptedModel::new(["a"]);
        model.push("b");
        assert_eq!(model.remaining(), 2);
    }
}
