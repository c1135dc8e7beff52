//! Tools the Researcher may call.
//!
//! This module provides:
//! - Tool definitions and outputs
//! - The registry that resolves model tool calls
//! - The `web_search` and `fetch_url` tools

mod definitions;
mod fetch;
mod registry;
mod search;

pub use definitions::{ToolDefinition, ToolOutput, TOOL_ERROR_MARKER};
pub use fetch::{FetchUrlTool, FETCH_URL_TOOL};
pub use registry::{tool_call, ResolvedToolCall, Tool, ToolRegistry, UnresolvedToolCall};
pub use search::{WebSearchTool, WEB_SEARCH_TOOL};
