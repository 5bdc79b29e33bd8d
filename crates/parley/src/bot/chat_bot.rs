//! The conversational bot loop.
//!
//! [`ChatBot::chat`] renders the prompt, asks the model for a completion,
//! and parses it. A final answer ends the call; a tool request runs the tool
//! through the [`ToolSet`], appends the step to the scratchpad, and asks
//! the model again, up to the configured turn limit.

use tracing::{info, trace};

use crate::bot::config::BotConfig;
use crate::bot::events::{BotEvent, BotResult, EventHandler, NoopHandler, generate_trace_id};
use crate::bot::history::ChatHistory;
use crate::bot::parser::{BotAction, OutputParser, ParseError};
use crate::bot::prompt::{PromptParts, PromptTemplate};
use crate::bot::scratchpad::{BotStep, Scratchpad};
use crate::llm::LanguageModel;
use crate::tools::ToolSet;

/// Output of a call that ran out of turns.
pub const TURN_LIMIT_MESSAGE: &str = "Bot stopped after reaching the turn limit.";

/// Failure that ends a `chat` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BotError {
    /// The model wrote neither a final answer nor a tool request.
    #[error("Could not parse model output: `{output}`")]
    Parse { output: String },
    /// The model call itself failed.
    #[error("model call failed: {0}")]
    Model(String),
}

impl From<ParseError> for BotError {
    fn from(e: ParseError) -> Self {
        BotError::Parse { output: e.output }
    }
}

/// A bot that holds a conversation and uses tools.
///
/// The bot borrows its model, tools, and event handler, and owns the chat
/// history, so successive [`chat`](Self::chat) calls see earlier exchanges.
///
/// ```
/// use parley::bot::{BotConfig, ChatBot};
/// use parley::llm::ScriptedModel;
/// use parley::tools::{FnTool, ToolSet};
///
/// let model = ScriptedModel::new([
///     "Thought: Do I need to use a tool? Yes\nAction: upper\nAction Input: hi",
///     "Thought: Do I need to use a tool? No\nAI: HI",
/// ]);
/// let tools = ToolSet::new()
///     .with(FnTool::new("upper", "Upper-cases text", |s: &str| Ok(s.to_uppercase())));
///
/// let mut bot = ChatBot::new(&model, &tools, BotConfig::default());
/// let result = bot.chat("shout hi").unwrap();
/// assert!(result.finished);
/// assert_eq!(result.output, "HI");
/// assert_eq!(result.steps[0].observation, "HI");
/// ```
pub struct ChatBot<'a> {
    model: &'a dyn LanguageModel,
    tools: &'a ToolSet,
    config: BotConfig,
    prompt: PromptTemplate,
    parser: OutputParser,
    event_handler: &'a dyn EventHandler,
    history: ChatHistory,
}

impl<'a> ChatBot<'a> {
    /// Create a bot with the default prompt.
    pub fn new(model: &'a dyn LanguageModel, tools: &'a ToolSet, config: BotConfig) -> Self {
        let prompt = PromptParts::default().build(tools, &config);
        let parser = OutputParser::new(&config.ai_prefix);
        Self {
            model,
            tools,
            config,
            prompt,
            parser,
            event_handler: &NoopHandler,
            history: ChatHistory::new(),
        }
    }

    /// Attach an event handler.
    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    /// Rebuild the prompt from custom text blocks.
    pub fn with_prompt_parts(mut self, parts: &PromptParts) -> Self {
        self.prompt = parts.build(self.tools, &self.config);
        self
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Forget earlier exchanges.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Answer one user input.
    ///
    /// Tool failures and unknown tool names do not end the call; they become
    /// the observation the model reads next. A completion that cannot be
    /// parsed, or a failed model call, ends it with an error. Reaching the
    /// turn limit is not an error: the result has `finished == false` and
    /// the exchange is not added to the history.
    pub fn chat(&mut self, input: &str) -> Result<BotResult, BotError> {
        let trace_id = generate_trace_id();
        let max_turns = self.config.max_turns;
        info!(
            "Chat started: trace_id={trace_id}, model={}, tools={:?}",
            self.model.model_name(),
            self.tools.names()
        );

        let chat_history = self
            .history
            .render(&self.config.human_prefix, &self.config.ai_prefix);
        let stop = self.config.stop();
        let mut scratchpad = Scratchpad::new();

        for turn in 1..=max_turns {
            self.event_handler
                .on_event(&BotEvent::TurnStart { turn, max_turns });

            let bot_scratchpad =
                scratchpad.render(&self.config.observation_prefix, &self.config.llm_prefix);
            let prompt = self.prompt.format(input, &chat_history, &bot_scratchpad);
            trace!("Prompt (turn {turn}):\n{prompt}");

            let output = self.model.complete(&prompt, &stop).map_err(BotError::Model)?;
            self.event_handler.on_event(&BotEvent::ModelOutput {
                turn,
                text: &output,
            });

            match self.parser.parse(&output)? {
                BotAction::Finish(answer) => {
                    self.history.record(input, answer.as_str());
                    self.event_handler.on_event(&BotEvent::Finished {
                        output: &answer,
                        turns_used: turn,
                    });
                    info!("Chat completed: trace_id={trace_id}, turns={turn}");
                    return Ok(BotResult {
                        trace_id,
                        output: answer,
                        steps: scratchpad.into_steps(),
                        turns_used: turn,
                        finished: true,
                    });
                }
                BotAction::Invoke { tool, input: tool_input } => {
                    self.event_handler.on_event(&BotEvent::ToolInvoking {
                        tool: &tool,
                        input: &tool_input,
                    });
                    let observation = self.tools.execute(&tool, &tool_input);
                    self.event_handler.on_event(&BotEvent::Observation {
                        tool: &tool,
                        observation: &observation,
                    });
                    scratchpad.push(BotStep {
                        log: output,
                        tool,
                        input: tool_input,
                        observation,
                    });
                }
            }
        }

        self.event_handler
            .on_event(&BotEvent::TurnLimitReached { max_turns });
        info!("Chat stopped at turn limit: trace_id={trace_id}, turns={max_turns}");
        Ok(BotResult {
            trace_id,
            output: TURN_LIMIT_MESSAGE.to_string(),
            steps: scratchpad.into_steps(),
            turns_used: max_turns,
            finished: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;
    use crate::tools::FnTool;

    fn echo_tools() -> ToolSet {
        ToolSet::new().with(FnTool::new("echo", "Echo the input", |s: &str| Ok(s.to_string())))
    }

    #[test]
    fn immediate_answer() {
        let model = ScriptedModel::new(["Thought: Do I need to use a tool? No\nAI: Hello!"]);
        let tools = echo_tools();
        let mut bot = ChatBot::new(&model, &tools, BotConfig::default());

        let result = bot.chat("hi").unwrap();
        assert!(result.finished);
        assert_eq!(result.output, "Hello!");
        assert_eq!(result.turns_used, 1);
        assert!(result.steps.is_empty());
        assert_eq!(bot.history().len(), 1);
    }

    #[test]
    fn stop_sequences_are_sent() {
        let model = ScriptedModel::new(["AI: ok"]);
        let tools = echo_tools();
        let mut bot = ChatBot::new(&model, &tools, BotConfig::default());
        bot.chat("hi").unwrap();
        assert_eq!(model.stops(), vec![vec!["\nObservation:", "\n\tObservation:"]]);
    }

    #[test]
    fn model_error_ends_call() {
        let model = ScriptedModel::default();
        let tools = echo_tools();
        let mut bot = ChatBot::new(&model, &tools, BotConfig::default());
        let err = bot.chat("hi").unwrap_err();
        assert!(matches!(err, BotError::Model(_)));
        assert!(bot.history().is_empty());
    }

    #[test]
    fn parse_error_carries_output() {
        let model = ScriptedModel::new(["I have no idea."]);
        let tools = echo_tools();
        let mut bot = ChatBot::new(&model, &tools, BotConfig::default());
        let err = bot.chat("hi").unwrap_err();
        assert_eq!(
            err,
            BotError::Parse {
                output: "I have no idea.".into()
            }
        );
        assert_eq!(err.to_string(), "Could not parse model output: `I have no idea.`");
    }

    #[test]
    fn custom_prompt_parts() {
        let model = ScriptedModel::new(["AI: ok"]);
        let tools = echo_tools();
        let parts = PromptParts::default()
            .with_prefix("You are terse.")
            .with_suffix("Q: {input}\n{bot_scratchpad}");
        let mut bot = ChatBot::new(&model, &tools, BotConfig::default()).with_prompt_parts(&parts);
        bot.chat("why?").unwrap();
        let prompt = &model.prompts()[0];
        assert!(prompt.starts_with("You are terse.\n\n> echo: Echo the input"));
        assert!(prompt.ends_with("Q: why?\n"));
    }
}
