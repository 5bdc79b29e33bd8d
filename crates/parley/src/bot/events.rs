//! Events, handlers, and results for the [`ChatBot`](super::chat_bot::ChatBot).
//!
//! The bot reports progress through [`BotEvent`] variants covering one
//! `chat` call: turn start, raw model output, tool invocation, observation,
//! and the two ways a call ends. Callers implement [`EventHandler`] to
//! observe them.
//!
//! # Choosing an event handler
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::bot::scratchpad::BotStep;

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted during one `chat` call.
#[derive(Debug)]
pub enum BotEvent<'a> {
    /// A model call is about to be made.
    TurnStart { turn: u32, max_turns: u32 },
    /// The model returned a completion.
    ModelOutput { turn: u32, text: &'a str },
    /// A tool is about to run.
    ToolInvoking { tool: &'a str, input: &'a str },
    /// A tool returned (or failed with) this observation.
    Observation { tool: &'a str, observation: &'a str },
    /// The model gave its final answer.
    Finished { output: &'a str, turns_used: u32 },
    /// The turn limit was reached without a final answer.
    TurnLimitReached { max_turns: u32 },
}

/// Observer for bot events.
///
/// # Example
///
/// ```
/// use parley::bot::{BotEvent, EventHandler};
///
/// struct PrintTools;
///
/// impl EventHandler for PrintTools {
///     fn on_event(&self, event: &BotEvent<'_>) {
///         if let BotEvent::ToolInvoking { tool, input } = event {
///             println!("{tool}({input})");
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &BotEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```
/// use parley::bot::{BotEvent, FnEventHandler};
///
/// let handler = FnEventHandler::new(|event: &BotEvent<'_>| {
///     if let BotEvent::Finished { output, .. } = event {
///         println!("{output}");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&BotEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&BotEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&BotEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &BotEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to several handlers in registration order.
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Add `handler` only when `condition` holds.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &BotEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// An event handler that logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &BotEvent<'_>) {
        match event {
            BotEvent::TurnStart { turn, max_turns } => {
                info!("[turn {turn}/{max_turns}]");
            }
            BotEvent::ModelOutput { turn, text } => {
                let preview: String = text.chars().take(200).collect();
                debug!(
                    "Model output (turn {turn}): {preview}{}",
                    if text.chars().count() > 200 { "..." } else { "" }
                );
            }
            BotEvent::ToolInvoking { tool, input } => {
                debug!("Invoking tool: {tool} ({} bytes input)", input.len());
            }
            BotEvent::Observation { tool, observation } => {
                debug!("Tool {tool} observation: {} bytes", observation.len());
            }
            BotEvent::Finished { turns_used, .. } => {
                info!("Bot finished after {turns_used} turn(s)");
            }
            BotEvent::TurnLimitReached { max_turns } => {
                info!("Bot hit turn limit ({max_turns})");
            }
        }
    }
}

// ── Run result ─────────────────────────────────────────────────────

/// The result of one [`ChatBot::chat`](super::chat_bot::ChatBot::chat) call.
#[derive(Debug, Clone)]
pub struct BotResult {
    /// Unique trace ID for this call.
    pub trace_id: String,
    /// The final answer, or the turn-limit message.
    pub output: String,
    /// Tool rounds in execution order.
    pub steps: Vec<BotStep>,
    /// Number of model calls made.
    pub turns_used: u32,
    /// Whether the model answered (vs. hitting the turn limit).
    pub finished: bool,
}

/// Generate a unique trace ID for a `chat` call.
pub fn generate_trace_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("tr-{ts:x}-{count:04x}")
}
