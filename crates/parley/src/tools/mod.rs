//! Tools the bot can invoke.
//!
//! Every capability the model can ask for is a [`Tool`] trait implementor:
//! a name, a description, and a text-to-text [`Tool::run`]. Tools are
//! collected into a [`ToolSet`] which handles dispatch by name, turns
//! failures into observation text, and truncates long output.
//!
//! # Defining tools
//!
//! - **[`FnTool`]**: closure-based. Best for small stateless tools.
//! - **`impl Tool`**: a struct holding its own clients or configuration.
//!
//! # Submodules
//!
//! - [`core`]: [`Tool`] trait, [`ToolError`], [`ToolSet`], [`FnTool`].
//! - [`browser`]: [`BrowserTool`] and the [`RequestsWrapper`] GET client.
//! - [`search`]: Google Custom Search tools over [`SearchApiWrapper`].
//! - [`registry`]: [`ToolRegistry`] / [`load_tools`] for building a set
//!   from configuration keys.
//! - [`names`]: tool names and registry keys.

pub mod browser;
pub mod core;
pub mod names;
pub mod registry;
pub mod search;

pub use browser::{BrowserTool, RequestsWrapper, filter_text};
pub use core::{
    DEFAULT_MAX_RESULT_BYTES, FnTool, Tool, ToolError, ToolFuture, ToolSet, truncate_result,
};
pub use registry::{AVAILABLE_TOOLS, ToolRegistry, load_tools};
pub use search::{GoogleSearch, GoogleSearchResults, SearchApiWrapper, SearchResult};
