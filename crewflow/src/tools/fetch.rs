//! The `fetch_url` tool.

use super::{Tool, ToolDefinition, ToolOutput};
use crate::errors::ToolError;
use crate::websearch::{is_fetch_error, Fetcher};
use async_trait::async_trait;
use serde::Deserialize;

/// Name the model uses for this tool.
pub const FETCH_URL_TOOL: &str = "fetch_url";

#[derive(Debug, Deserialize)]
struct FetchArgs {
    url: String,
    #[serde(default)]
    max_chars: Option<usize>,
}

/// Fetches a URL and returns cleaned article text.
///
/// Failures come back as a `[fetch_error]` string, never as an error.
#[derive(Debug, Clone, Default)]
pub struct FetchUrlTool {
    fetcher: Fetcher,
}

impl FetchUrlTool {
    /// Creates the tool over a fetcher.
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &str {
        FETCH_URL_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(FETCH_URL_TOOL)
            .with_description("Fetch a URL and return cleaned article text (best effort).")
            .with_parameters(serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "Absolute http(s) URL to fetch"},
                    "max_chars": {
                        "type": "integer",
                        "minimum": 1,
                        "default": self.fetcher.config().max_chars,
                        "description": "Maximum characters of text to return"
                    }
                },
                "required": ["url"]
            }))
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let args: FetchArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(FETCH_URL_TOOL, e.to_string()))?;
        let max_chars = args.max_chars.unwrap_or(self.fetcher.config().max_chars);

        let text = self.fetcher.fetch(&args.url, max_chars).await;
        let mut output = ToolOutput::ok(serde_json::json!(text));
        output.success = !is_fetch_error(&text);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websearch::FetchConfig;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_tool_honours_max_chars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>abcdefghij</p>"))
            .mount(&server)
            .await;

        let tool = FetchUrlTool::new(Fetcher::new(FetchConfig::default()));
        let output = tool
            .call(serde_json::json!({"url": server.uri(), "max_chars": 4}))
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(output.to_message_content(), "abcd");
    }

    #[tokio::test]
    async fn test_fetch_tool_rejects_missing_url() {
        let err = FetchUrlTool::default()
            .call(serde_json::json!({"max_chars": 10}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_definition_requires_url() {
        let def = FetchUrlTool::default().definition();
        assert_eq!(def.name, "fetch_url");
        assert_eq!(def.parameters["required"], serde_json::json!(["url"]));
        assert_eq!(def.parameters["properties"]["max_chars"]["default"], 8000);
    }
}
