//! Minimal bot example: one question, answered with the browser tool.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run --example basic_bot
//! ```

use parley::prelude::*;

fn main() -> Result<(), String> {
    // 1. Create the completion client.
    let api_key = std::env::var("OPENROUTER_KEY")
        .map_err(|_| "Set OPENROUTER_KEY env var to your OpenRouter API key")?;
    let client = OpenRouterClient::new(api_key)?.with_max_tokens(256);

    // 2. Register the tools the model can ask for.
    let tools = ToolSet::new().with(BrowserTool::new());

    // 3. Ask a question.
    let mut bot = ChatBot::new(&client, &tools, BotConfig::default().with_max_turns(5))
        .with_event_handler(&LoggingHandler);
    let result = bot
        .chat("What does the page at https://example.com say?")
        .map_err(|e| e.to_string())?;

    // 4. Print results.
    println!("\n{}", result.output);
    println!(
        "\n--- {} turn(s) | {} tool call(s) | finished: {} ---",
        result.turns_used,
        result.steps.len(),
        result.finished
    );

    Ok(())
}
