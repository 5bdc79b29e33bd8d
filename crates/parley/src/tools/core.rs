//! Tool abstraction for the chat bot.
//!
//! The [`Tool`] trait defines what every tool provides: a name, a
//! description the model reads in its prompt, and a synchronous
//! [`Tool::run`] from one text input to one text output. Tools are collected
//! into a [`ToolSet`] which handles dispatch by name, failure capture, and
//! result truncation.

use futures::future::BoxFuture;
use std::fmt;
use tracing::{debug, info, trace, warn};

/// Maximum size (in bytes) for tool output before truncation.
pub const DEFAULT_MAX_RESULT_BYTES: usize = 8_000;

/// Boxed future returned by [`Tool::arun`].
pub type ToolFuture<'a> = BoxFuture<'a, Result<String, ToolError>>;

// ── Errors ─────────────────────────────────────────────────────────

/// Failure of a single tool invocation.
///
/// The [`ToolSet`] turns these into observation text with `to_string()`, so
/// the `Display` output is what the model reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// The tool ran but could not produce a result.
    #[error("Error: {0}")]
    Failed(String),
    /// The tool was invoked through [`Tool::arun`], which it does not support.
    #[error("Error: tool '{tool}' does not support async invocation")]
    AsyncUnsupported { tool: String },
}

impl ToolError {
    pub fn failed(message: impl Into<String>) -> Self {
        ToolError::Failed(message.into())
    }
}

// ── Tool trait ─────────────────────────────────────────────────────

/// A named, described text-to-text capability the bot can invoke.
///
/// # Example
///
/// ```
/// use parley::tools::{Tool, ToolError};
///
/// struct Shout;
///
/// impl Tool for Shout {
///     fn name(&self) -> &str { "shout" }
///     fn description(&self) -> &str { "Upper-cases its input." }
///     fn run(&self, input: &str) -> Result<String, ToolError> {
///         Ok(input.to_uppercase())
///     }
/// }
///
/// assert_eq!(Shout.run("hi").unwrap(), "HI");
/// ```
pub trait Tool: Send + Sync {
    /// Unique name the model uses after `Action:`.
    fn name(&self) -> &str;

    /// One-paragraph description listed in the prompt.
    fn description(&self) -> &str;

    /// Run the tool synchronously on the given input.
    fn run(&self, input: &str) -> Result<String, ToolError>;

    /// Run the tool asynchronously.
    ///
    /// Tools are synchronous; the default implementation resolves to
    /// [`ToolError::AsyncUnsupported`].
    fn arun(&self, input: &str) -> ToolFuture<'_> {
        let _ = input;
        let tool = self.name().to_string();
        Box::pin(async move { Err(ToolError::AsyncUnsupported { tool }) })
    }
}

// ── ToolSet ────────────────────────────────────────────────────────

/// An ordered collection of uniquely named tools.
///
/// Registration order is kept: it is the order tools are listed in the
/// prompt.
///
/// ```
/// use parley::tools::{FnTool, ToolSet};
///
/// let tools = ToolSet::new()
///     .with(FnTool::new("echo", "Echo the input", |input: &str| Ok(input.to_string())));
/// assert_eq!(tools.execute("echo", "hello"), "hello");
/// assert!(tools.execute("nope", "x").contains("is not a valid tool"));
/// ```
pub struct ToolSet {
    tools: Vec<Box<dyn Tool>>,
    max_result_bytes: usize,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .field("max_result_bytes", &self.max_result_bytes)
            .finish()
    }
}

impl ToolSet {
    /// Create an empty tool set.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
        }
    }

    /// Set the maximum result size in bytes before truncation.
    pub fn with_max_result_bytes(mut self, max: usize) -> Self {
        self.max_result_bytes = max;
        self
    }

    /// Register a tool. Fails if a tool with the same name is already present.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), String> {
        if self.get(tool.name()).is_some() {
            return Err(format!("duplicate tool name '{}'", tool.name()));
        }
        self.tools.push(Box::new(tool));
        Ok(())
    }

    /// Register a tool (builder pattern). A duplicate name is logged and the
    /// first registration is kept.
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        if let Err(e) = self.register(tool) {
            warn!("ignoring tool: {e}");
        }
        self
    }

    /// Conditionally register a tool (builder pattern).
    pub fn with_if(self, condition: bool, tool: impl Tool + 'static) -> Self {
        if condition { self.with(tool) } else { self }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Iterate over the registered tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|t| t.as_ref())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name and return the observation text.
    ///
    /// Never fails: an unknown name and a tool error both come back as text
    /// for the model to read. Successful output is truncated to
    /// `max_result_bytes`.
    pub fn execute(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.get(name) else {
            info!("[tool] unknown tool requested: {name}");
            return format!("{name} is not a valid tool, try another one.");
        };

        log_tool_call(name, input);
        let start = std::time::Instant::now();

        let result = match tool.run(input) {
            Ok(output) => output,
            Err(e) => {
                warn!("[tool] {name} failed: {e}");
                e.to_string()
            }
        };

        debug!(
            "Tool {name} completed in {:.0}ms ({} bytes)",
            start.elapsed().as_secs_f64() * 1000.0,
            result.len()
        );
        trace!("Tool {name} result: {result}");

        truncate_result(result, self.max_result_bytes)
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── FnTool ────────────────────────────────────────────────────────

/// Type-erased handler for [`FnTool`].
type ToolHandler = Box<dyn Fn(&str) -> Result<String, ToolError> + Send + Sync>;

/// A closure-based tool.
///
/// Use it for stateless tools. For tools that hold clients or
/// configuration, define a struct and implement [`Tool`] directly.
pub struct FnTool {
    name: String,
    description: String,
    handler: ToolHandler,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Box::new(handler),
        }
    }
}

impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, input: &str) -> Result<String, ToolError> {
        (self.handler)(input)
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Log a tool call at INFO level with a truncated preview of the input.
pub fn log_tool_call(name: &str, input: &str) {
    let preview: String = input.chars().take(120).collect();
    info!(
        "[tool] {}({preview}{})",
        name,
        if input.chars().count() > 120 { "..." } else { "" }
    );
    trace!("[tool] {name} input: {input}");
}

/// Truncate a string to at most `max` bytes (on a char boundary), appending a
/// notice if trimmed.
pub fn truncate_result(mut s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let total = s.len();
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
    s.push_str(&format!("...\n[truncated: {total} bytes total]"));
    s
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input"
        }

        fn run(&self, input: &str) -> Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    struct FailTool;

    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn run(&self, _input: &str) -> Result<String, ToolError> {
            Err(ToolError::failed("intentional failure"))
        }
    }

    #[test]
    fn toolset_keeps_registration_order() {
        let set = ToolSet::new().with(FailTool).with(EchoTool);
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["fail", "echo"]);
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut set = ToolSet::new();
        set.register(EchoTool).unwrap();
        let err = set.register(EchoTool).unwrap_err();
        assert!(err.contains("duplicate tool name 'echo'"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn with_keeps_first_registration_on_duplicate() {
        let set = ToolSet::new()
            .with(EchoTool)
            .with(FnTool::new("echo", "other", |_: &str| Ok("second".into())));
        assert_eq!(set.len(), 1);
        assert_eq!(set.execute("echo", "first"), "first");
    }

    #[test]
    fn execute_known_tool() {
        let set = ToolSet::new().with(EchoTool);
        assert_eq!(set.execute("echo", "hello"), "hello");
    }

    #[test]
    fn execute_unknown_tool_returns_observation() {
        let set = ToolSet::new().with(EchoTool);
        assert_eq!(
            set.execute("Calculator", "1+1"),
            "Calculator is not a valid tool, try another one."
        );
    }

    #[test]
    fn execute_failing_tool_returns_error_text() {
        let set = ToolSet::new().with(FailTool);
        assert_eq!(set.execute("fail", "x"), "Error: intentional failure");
    }

    #[test]
    fn execute_truncates_long_results() {
        let big = FnTool::new("big", "Returns a big result", |_: &str| Ok("a".repeat(200)));
        let set = ToolSet::new().with_max_result_bytes(50).with(big);
        let result = set.execute("big", "");
        assert!(result.starts_with(&"a".repeat(50)));
        assert!(result.contains("[truncated: 200 bytes total]"));
    }

    #[test]
    fn truncate_short_unchanged() {
        assert_eq!(truncate_result("hello".into(), 100), "hello");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // Each 'é' is two bytes; cutting at 3 must back off to 2.
        let result = truncate_result("ééé".into(), 3);
        assert!(result.starts_with("é..."));
        assert!(result.contains("[truncated: 6 bytes total]"));
    }

    #[test]
    fn with_if_false_skips_tool() {
        let set = ToolSet::new().with_if(false, EchoTool).with_if(true, FailTool);
        assert_eq!(set.names(), vec!["fail"]);
    }

    #[test]
    fn fn_tool_delegates_to_closure() {
        let tool = FnTool::new("len", "Count characters", |input: &str| {
            Ok(input.chars().count().to_string())
        });
        assert_eq!(tool.name(), "len");
        assert_eq!(tool.run("four").unwrap(), "4");
        assert!(format!("{tool:?}").contains("len"));
    }

    #[tokio::test]
    async fn arun_is_unsupported_by_default() {
        let err = EchoTool.arun("hello").await.unwrap_err();
        assert_eq!(
            err,
            ToolError::AsyncUnsupported {
                tool: "echo".into()
            }
        );
        assert!(err.to_string().contains("does not support async"));
    }
}
