//! Custom tools example: a struct tool, a closure tool, and a scripted model.
//!
//! Runs offline. The [`ScriptedModel`] plays the part of the language model
//! so the whole Thought / Action / Observation loop can be watched without
//! an API key.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example custom_tools
//! ```

use std::collections::HashMap;

use parley::prelude::*;

/// A read-only tool with its own state.
struct Dictionary {
    entries: HashMap<&'static str, &'static str>,
}

impl Dictionary {
    fn new() -> Self {
        let entries = HashMap::from([
            ("ephemeral", "lasting for a very short time"),
            ("parley", "a discussion between opposing sides"),
        ]);
        Self { entries }
    }
}

impl Tool for Dictionary {
    fn name(&self) -> &str {
        "Dictionary"
    }

    fn description(&self) -> &str {
        "Looks up the meaning of an English word. Input should be a single word."
    }

    fn run(&self, input: &str) -> Result<String, ToolError> {
        let word = input.trim().to_lowercase();
        self.entries
            .get(word.as_str())
            .map(|d| format!("{word}: {d}"))
            .ok_or_else(|| ToolError::failed(format!("no entry for '{word}'")))
    }
}

fn main() -> Result<(), String> {
    // Simulate a feature flag.
    let counting_enabled = true;

    let tools = ToolSet::new().with(Dictionary::new()).with_if(
        counting_enabled,
        FnTool::new("Letter Count", "Counts the letters in a word.", |input: &str| {
            Ok(input.chars().filter(|c| c.is_alphabetic()).count().to_string())
        }),
    );

    let model = ScriptedModel::new([
        "Thought: Do I need to use a tool? Yes\nAction: Dictionary\nAction Input: \"parley\"",
        "Thought: Do I need to use a tool? Yes\nAction: Letter Count\nAction Input: parley",
        "Thought: Do I need to use a tool? No\n\
         AI: \"Parley\" means a discussion between opposing sides, and it has 6 letters.",
    ]);

    // Compose event handlers: logging + a closure that prints each step.
    let handler = CompositeEventHandler::new()
        .with(LoggingHandler)
        .with(FnEventHandler::new(|event: &BotEvent<'_>| {
            if let BotEvent::Observation { tool, observation } = event {
                eprintln!("[{tool}] {observation}");
            }
        }));

    let mut bot = ChatBot::new(&model, &tools, BotConfig::default()).with_event_handler(&handler);
    let result = bot
        .chat("What does 'parley' mean, and how long is it?")
        .map_err(|e| e.to_string())?;

    println!("\n{}", result.output);
    println!("\n--- final prompt ---\n{}", model.prompts().last().map_or("", String::as_str));
    Ok(())
}
