//! Prompt assembly.
//!
//! The prompt is four blocks separated by blank lines: a prefix, the tool
//! list (`> name: description` per tool), the format instructions, and a
//! suffix carrying the conversation so far. Placeholders of the form
//! `{name}` are filled in by [`render`].

use std::sync::LazyLock;

use regex::Regex;

use crate::bot::config::BotConfig;
use crate::tools::ToolSet;

pub const PREFIX: &str = "Assistant is a large language model able to help with a wide range of \
tasks, from answering simple questions to giving in-depth explanations and discussions on many \
topics. Assistant can hold a natural conversation and give coherent, relevant responses.

Assistant does not know about recent events or the content of web pages on its own. When a \
question needs fresh or specific information, Assistant uses one of the tools below and bases \
its answer on what the tool returns.

TOOLS:
------

Assistant has access to the following tools:";

pub const FORMAT_INSTRUCTIONS: &str = "To use a tool, please use the following format:

```
Thought: Do I need to use a tool? Yes
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
```

When you have a response to say to the {human_prefix}, or if you do not need to use a tool, \
you MUST use the format:

```
Thought: Do I need to use a tool? No
{ai_prefix}: [your response here]
```";

pub const SUFFIX: &str = "Begin!

Previous conversation history:
{chat_history}

New input: {input}
{bot_scratchpad}";

/// Variables every assembled prompt expects.
pub const INPUT_VARIABLES: &[&str] = &["input", "chat_history", "bot_scratchpad"];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder regex"));

/// Replace each `{name}` in `template` with its value from `vars`.
///
/// Substitution is a single pass over the template: values are inserted
/// verbatim and never rescanned. Placeholders without a value are left as
/// they are.
///
/// ```
/// use parley::bot::prompt::render;
///
/// let out = render("Hi {name}, {missing}", &[("name", "{name}")]);
/// assert_eq!(out, "Hi {name}, {missing}");
/// ```
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// An assembled prompt with `{input}`, `{chat_history}`, and
/// `{bot_scratchpad}` still open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Fill in the conversation variables.
    pub fn format(&self, input: &str, chat_history: &str, bot_scratchpad: &str) -> String {
        render(
            &self.template,
            &[
                ("input", input),
                ("chat_history", chat_history),
                ("bot_scratchpad", bot_scratchpad),
            ],
        )
    }
}

/// The text blocks a prompt is assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParts {
    pub prefix: String,
    pub format_instructions: String,
    pub suffix: String,
}

impl Default for PromptParts {
    fn default() -> Self {
        Self {
            prefix: PREFIX.into(),
            format_instructions: FORMAT_INSTRUCTIONS.into(),
            suffix: SUFFIX.into(),
        }
    }
}

impl PromptParts {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_format_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.format_instructions = instructions.into();
        self
    }

    /// Assemble the prompt for `tools`. The format instructions get the tool
    /// names and speaker prefixes filled in now; the conversation variables
    /// stay open for [`PromptTemplate::format`].
    pub fn build(&self, tools: &ToolSet, config: &BotConfig) -> PromptTemplate {
        let tool_strings = tools
            .iter()
            .map(|t| format!("> {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let tool_names = tools.names().join(", ");
        let instructions = render(
            &self.format_instructions,
            &[
                ("tool_names", tool_names.as_str()),
                ("ai_prefix", config.ai_prefix.as_str()),
                ("human_prefix", config.human_prefix.as_str()),
            ],
        );
        let template = [
            self.prefix.as_str(),
            tool_strings.as_str(),
            instructions.as_str(),
            self.suffix.as_str(),
        ]
        .join("\n\n");
        PromptTemplate::new(template)
    }
}

/// Assemble the default prompt for `tools`.
pub fn create_prompt(tools: &ToolSet, config: &BotConfig) -> PromptTemplate {
    PromptParts::default().build(tools, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FnTool;

    fn tools() -> ToolSet {
        ToolSet::new()
            .with(FnTool::new("echo", "Repeats the input.", |s: &str| Ok(s.to_string())))
            .with(FnTool::new("upper", "Upper-cases the input.", |s: &str| {
                Ok(s.to_uppercase())
            }))
    }

    #[test]
    fn render_substitutes_known_placeholders() {
        assert_eq!(render("a {x} b {y}", &[("x", "1"), ("y", "2")]), "a 1 b 2");
    }

    #[test]
    fn render_does_not_rescan_values() {
        assert_eq!(render("{a}", &[("a", "{b}"), ("b", "no")]), "{b}");
    }

    #[test]
    fn render_ignores_non_placeholder_braces() {
        assert_eq!(render("{\"k\": 1} {Upper}", &[]), "{\"k\": 1} {Upper}");
    }

    #[test]
    fn prompt_lists_tools_in_order() {
        let prompt = create_prompt(&tools(), &BotConfig::default());
        let text = prompt.template();
        assert!(text.contains("> echo: Repeats the input.\n> upper: Upper-cases the input."));
        assert!(text.contains("should be one of [echo, upper]"));
        assert!(text.contains("say to the Human"));
        assert!(text.contains("\nAI: [your response here]"));
    }

    #[test]
    fn prompt_blocks_joined_by_blank_lines() {
        let parts = PromptParts::default()
            .with_prefix("P")
            .with_format_instructions("F {ai_prefix}")
            .with_suffix("S {input}");
        let prompt = parts.build(&tools(), &BotConfig::default().with_ai_prefix("Bot"));
        assert_eq!(
            prompt.template(),
            "P\n\n> echo: Repeats the input.\n> upper: Upper-cases the input.\n\nF Bot\n\nS {input}"
        );
    }

    #[test]
    fn format_fills_conversation_variables() {
        let prompt = create_prompt(&tools(), &BotConfig::default());
        let text = prompt.format("what?", "Human: hi\nAI: hello", "Action: echo");
        assert!(text.ends_with("Previous conversation history:\nHuman: hi\nAI: hello\n\nNew input: what?\nAction: echo"));
        for var in INPUT_VARIABLES {
            assert!(!text.contains(&format!("{{{var}}}")));
        }
    }
}
