//! The `web_search` tool.

use super::{Tool, ToolDefinition, ToolOutput};
use crate::errors::ToolError;
use crate::websearch::{WebSearcher, MAX_SEARCH_RESULTS};
use async_trait::async_trait;
use serde::Deserialize;

/// Name the model uses for this tool.
pub const WEB_SEARCH_TOOL: &str = "web_search";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

/// Searches the web and returns `{title, link, snippet}` results.
#[derive(Debug, Clone, Default)]
pub struct WebSearchTool {
    searcher: WebSearcher,
}

impl WebSearchTool {
    /// Creates the tool over a searcher.
    #[must_use]
    pub fn new(searcher: WebSearcher) -> Self {
        Self { searcher }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(WEB_SEARCH_TOOL)
            .with_description("Search DuckDuckGo and return {title, link, snippet} results.")
            .with_parameters(serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"},
                    "max_results": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_SEARCH_RESULTS,
                        "default": self.searcher.default_max_results()
                    }
                },
                "required": ["query"]
            }))
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let args: SearchArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(WEB_SEARCH_TOOL, e.to_string()))?;

        let results = self.searcher.search(&args.query, args.max_results).await;
        let data = serde_json::to_value(&results)
            .map_err(|e| ToolError::execution_failed(WEB_SEARCH_TOOL, e.to_string()))?;
        Ok(ToolOutput::ok(data))
    }
}
