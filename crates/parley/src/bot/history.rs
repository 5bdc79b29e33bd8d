//! Prior exchanges of a conversation, rendered into each prompt.

/// One user input and the bot's final answer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub human: String,
    pub ai: String,
}

/// Append-only conversation history.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    exchanges: Vec<Exchange>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, human: impl Into<String>, ai: impl Into<String>) {
        self.exchanges.push(Exchange {
            human: human.into(),
            ai: ai.into(),
        });
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// `"{human_prefix}: ..\n{ai_prefix}: .."` per exchange, joined by newlines.
    pub fn render(&self, human_prefix: &str, ai_prefix: &str) -> String {
        self.exchanges
            .iter()
            .map(|e| format!("{human_prefix}: {}\n{ai_prefix}: {}", e.human, e.ai))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
