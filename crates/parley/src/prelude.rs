//! Convenience re-exports for common `parley` types.
//!
//! ```ignore
//! use parley::prelude::*;
//! ```
//!
//! Pulls in the client, the bot and its config, event handlers, the
//! [`Tool`] trait with [`ToolSet`], and the built-in tools. Prompt pieces,
//! the parser, and registry internals stay in their modules.

// ── Models ──────────────────────────────────────────────────────────
pub use crate::OpenRouterClient;
pub use crate::llm::{LanguageModel, ScriptedModel};

// ── Bot ─────────────────────────────────────────────────────────────
pub use crate::bot::{
    BotConfig, BotError, BotEvent, BotResult, ChatBot, CompositeEventHandler, EventHandler,
    FnEventHandler, LoggingHandler, NoopHandler,
};

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::{
    BrowserTool, FnTool, GoogleSearch, GoogleSearchResults, SearchApiWrapper, Tool, ToolError,
    ToolSet,
};
