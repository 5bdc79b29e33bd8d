//! Chat with a tool-using bot from the terminal.
//!
//! Reads the completion API key from `OPENROUTER_KEY`. Search tools also
//! need `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`.
//!
//! # Examples
//!
//! ```sh
//! # One question, then exit
//! parley --input "What is on https://example.com?"
//!
//! # Interactive session with search, showing each tool call
//! parley --tool google-search --tool browser --show-steps
//!
//! # Settings from a file, model overridden on the command line
//! parley --config parley.json --model anthropic/claude-sonnet-4
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use parley::bot::{BotEvent, ChatBot, CompositeEventHandler, EventHandler, LoggingHandler};
use parley::config::{AppConfig, ConfigOverrides};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Chat with a tool-using bot.
///
/// Reads the API key from the OPENROUTER_KEY environment variable.
#[derive(Parser)]
#[command(name = "parley", version)]
struct Cli {
    /// Answer this input and exit. Without it, reads inputs from stdin.
    #[arg(long)]
    input: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    // ── Overrides ──────────────────────────────────────────────
    /// Model to use for completions
    #[arg(long)]
    model: Option<String>,

    /// Chat completions endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Tool to load (repeatable): browser, google-search, google-search-json
    #[arg(long = "tool")]
    tools: Vec<String>,

    /// Maximum model calls per input
    #[arg(long)]
    max_turns: Option<u32>,

    /// Maximum tokens per completion
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature (0.0 – 2.0)
    #[arg(long)]
    temperature: Option<f32>,

    // ── Output ─────────────────────────────────────────────────
    /// Print each model output and tool call to stderr
    #[arg(long)]
    show_steps: bool,

    /// Log filter (e.g. "debug", "parley=trace"); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            tools: (!self.tools.is_empty()).then(|| self.tools.clone()),
            max_turns: self.max_turns,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Prints bot progress to stderr for `--show-steps`.
struct CliEventHandler;

impl EventHandler for CliEventHandler {
    fn on_event(&self, event: &BotEvent<'_>) {
        match event {
            BotEvent::TurnStart { turn, max_turns } => {
                eprintln!("  [turn {turn}/{max_turns}]");
            }
            BotEvent::ModelOutput { text, .. } => {
                for line in text.lines() {
                    eprintln!("  | {line}");
                }
            }
            BotEvent::Observation { tool, observation } => {
                let preview: String = observation.chars().take(300).collect();
                eprintln!("  [{tool}] {preview}");
            }
            BotEvent::TurnLimitReached { max_turns } => {
                eprintln!("  [stopped after {max_turns} turns]");
            }
            _ => {}
        }
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?.apply(cli.overrides());
    config.validate()?;

    let api_key = std::env::var("OPENROUTER_KEY")
        .map_err(|_| "OPENROUTER_KEY environment variable is not set".to_string())?;
    let client = config.build_client(api_key)?;
    let tools = config.build_tool_set()?;

    let handler = CompositeEventHandler::new()
        .with(LoggingHandler)
        .with_if(cli.show_steps, CliEventHandler);
    let mut bot =
        ChatBot::new(&client, &tools, config.build_bot_config()).with_event_handler(&handler);

    if let Some(input) = &cli.input {
        let result = bot.chat(input).map_err(|e| e.to_string())?;
        println!("{}", result.output);
        return Ok(());
    }

    let human = format!("{}: ", config.human_prefix);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{human}");
        io::stdout()
            .flush()
            .map_err(|e| format!("failed to write prompt: {e}"))?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.map_err(|e| format!("failed to read stdin: {e}"))?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        match bot.chat(input) {
            Ok(result) => println!("{}: {}", config.ai_prefix, result.output),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
