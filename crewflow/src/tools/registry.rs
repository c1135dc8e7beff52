//! Tool registry and resolution of model tool calls.

use super::{ToolDefinition, ToolOutput};
use crate::errors::ToolError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A resolved tool call ready for execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedToolCall {
    /// The call ID.
    pub id: String,
    /// The tool name.
    pub name: String,
    /// The parsed arguments.
    pub arguments: serde_json::Value,
    /// The original raw call.
    pub raw: serde_json::Value,
}

/// A tool call that failed parsing or resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedToolCall {
    /// The call ID if available.
    pub id: Option<String>,
    /// The tool name if available.
    pub name: Option<String>,
    /// The error message.
    pub error: String,
    /// The original raw call.
    pub raw: serde_json::Value,
}

/// Trait for tool implementations.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's name.
    fn name(&self) -> &str;

    /// Returns the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with already-parsed arguments.
    async fn call(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError>;
}

/// Registry of the tools bound to one agent.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.write().insert(name, tool);
    }

    /// Gets a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// Checks if a tool is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// Lists registered tool names, sorted.
    #[must_use]
    pub fn list_tools(&self) -> Vec<String> {
        self.tools.read().keys().cloned().collect()
    }

    /// Returns true if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    /// Returns every definition in the chat-completions `tools` format.
    #[must_use]
    pub fn openai_schemas(&self) -> Vec<serde_json::Value> {
        self.tools
            .read()
            .values()
            .map(|tool| tool.definition().to_openai_schema())
            .collect()
    }

    /// Parses and resolves OpenAI-style tool calls
    /// (`{id, function: {name, arguments}}`).
    pub fn parse_and_resolve(
        &self,
        calls: &[serde_json::Value],
    ) -> Vec<Result<ResolvedToolCall, UnresolvedToolCall>> {
        calls.iter().map(|call| self.resolve_call(call)).collect()
    }

    fn resolve_call(&self, call: &serde_json::Value) -> Result<ResolvedToolCall, UnresolvedToolCall> {
        let id = call.get("id").and_then(|v| v.as_str()).map(String::from);
        let unresolved = |name: Option<String>, error: String| UnresolvedToolCall {
            id: id.clone(),
            name,
            error,
            raw: call.clone(),
        };

        let Some(function) = call.get("function") else {
            return Err(unresolved(None, "Missing function wrapper".to_string()));
        };

        let Some(name) = function.get("name").and_then(|v| v.as_str()).map(String::from) else {
            return Err(unresolved(None, "Missing tool name".to_string()));
        };

        let arguments = match function.get("arguments") {
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => serde_json::json!({}),
            Some(serde_json::Value::String(s)) => match serde_json::from_str(s) {
                Ok(args @ serde_json::Value::Object(_)) => args,
                Ok(_) => {
                    return Err(unresolved(
                        Some(name),
                        "Arguments must be a JSON object".to_string(),
                    ))
                }
                Err(e) => {
                    return Err(unresolved(Some(name), format!("Invalid JSON in arguments: {e}")))
                }
            },
            Some(serde_json::Value::Object(obj)) => serde_json::Value::Object(obj.clone()),
            Some(_) | None => serde_json::json!({}),
        };

        if !self.contains(&name) {
            let error = format!("No tool registered with name '{name}'");
            return Err(unresolved(Some(name), error));
        }

        Ok(ResolvedToolCall {
            id: id.clone().unwrap_or_default(),
            name,
            arguments,
            raw: call.clone(),
        })
    }

    /// Executes a resolved call.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] if the tool disappeared since
    /// resolution, or whatever the tool itself returns.
    pub async fn execute(&self, call: &ResolvedToolCall) -> Result<ToolOutput, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::not_found(&call.name))?;
        tool.call(call.arguments.clone()).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tools())
            .finish()
    }
}

/// Builds a raw OpenAI-style tool call.
#[must_use]
pub fn tool_call(id: &str, name: &str, arguments: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "type": "function",
        "function": {
            "name": name,
            "arguments": arguments.to_string(),
        }
    })
}
