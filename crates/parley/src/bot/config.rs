//! Configuration for the [`ChatBot`](super::chat_bot::ChatBot).
//!
//! ```
//! use parley::bot::BotConfig;
//!
//! let config = BotConfig::default()
//!     .with_max_turns(5)
//!     .with_ai_prefix("Assistant");
//! assert_eq!(config.final_answer_marker(), "Assistant:");
//! assert_eq!(config.stop(), vec!["\nObservation:", "\n\tObservation:"]);
//! ```

/// Turn limit used when none is configured.
pub const DEFAULT_MAX_TURNS: u32 = 15;

/// Prefixes and limits that shape the prompt and the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// Speaker label of the bot. `"{ai_prefix}:"` in model output marks the
    /// final answer.
    pub ai_prefix: String,
    /// Speaker label of the user in the prompt and chat history.
    pub human_prefix: String,
    /// Written before each tool result in the scratchpad.
    pub observation_prefix: String,
    /// Written after each observation to cue the model's next thought.
    pub llm_prefix: String,
    /// Maximum number of model calls for one `chat` call.
    pub max_turns: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            ai_prefix: "AI".into(),
            human_prefix: "Human".into(),
            observation_prefix: "Observation: ".into(),
            llm_prefix: "Thought:".into(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl BotConfig {
    pub fn with_ai_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ai_prefix = prefix.into();
        self
    }

    pub fn with_human_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.human_prefix = prefix.into();
        self
    }

    pub fn with_observation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.observation_prefix = prefix.into();
        self
    }

    pub fn with_llm_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.llm_prefix = prefix.into();
        self
    }

    /// Set the turn limit. Zero is raised to one.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// The text that introduces a final answer, e.g. `"AI:"`.
    pub fn final_answer_marker(&self) -> String {
        format!("{}:", self.ai_prefix)
    }

    /// Stop sequences that end a completion before the model writes its own
    /// observation.
    pub fn stop(&self) -> Vec<String> {
        let observation = self.observation_prefix.trim_end();
        vec![format!("\n{observation}"), format!("\n\t{observation}")]
    }
}
