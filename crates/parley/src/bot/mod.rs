//! The conversational bot: prompt, model call, parse, dispatch, repeat.
//!
//! # Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chat_bot`] | [`ChatBot`] loop and [`BotError`] |
//! | [`config`] | [`BotConfig`]: speaker prefixes, turn limit, stop sequences |
//! | [`parser`] | [`OutputParser`] turning completions into [`BotAction`]s |
//! | [`scratchpad`] | [`Scratchpad`] of [`BotStep`]s for the current call |
//! | [`history`] | [`ChatHistory`] of earlier exchanges |
//! | [`prompt`] | Prompt text blocks, [`PromptParts`], placeholder rendering |
//! | [`events`] | [`BotEvent`], [`EventHandler`] implementations, [`BotResult`] |

pub mod chat_bot;
pub mod config;
pub mod events;
pub mod history;
pub mod parser;
pub mod prompt;
pub mod scratchpad;

pub use chat_bot::{BotError, ChatBot, TURN_LIMIT_MESSAGE};
pub use config::{BotConfig, DEFAULT_MAX_TURNS};
pub use events::{
    BotEvent, BotResult, CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler,
    NoopHandler, generate_trace_id,
};
pub use history::{ChatHistory, Exchange};
pub use parser::{BotAction, OutputParser, ParseError};
pub use prompt::{PromptParts, PromptTemplate, create_prompt};
pub use scratchpad::{BotStep, Scratchpad};
