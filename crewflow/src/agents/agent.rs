//! Tool-calling agent loop.

use super::AgentRole;
use crate::config::{DEFAULT_MAX_AGENT_ITERATIONS, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::context::StageContext;
use crate::core::StageEvent;
use crate::errors::CrewflowError;
use crate::llm::{ChatMessage, LlmClient, LlmRequest};
use crate::tools::{ResolvedToolCall, ToolRegistry, UnresolvedToolCall, TOOL_ERROR_MARKER};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message sent when the iteration budget is spent.
const FINAL_ANSWER_PROMPT: &str =
    "You have used all available tool calls. Stop calling tools and write your final answer now.";

struct ToolReply {
    call_id: String,
    tool: String,
    ok: bool,
    content: String,
}

/// A persona bound to a model, its tools and generation settings.
pub struct Agent {
    role: AgentRole,
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    temperature: f32,
    max_tokens: u32,
    max_iterations: usize,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.role)
            .field("model", &self.llm.model_name())
            .field("tools", &self.tools.list_tools())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

impl Agent {
    /// Creates an agent without tools and with default generation settings.
    #[must_use]
    pub fn new(role: AgentRole, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            role,
            llm,
            tools: Arc::new(ToolRegistry::new()),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_iterations: DEFAULT_MAX_AGENT_ITERATIONS,
        }
    }

    /// Binds a tool registry.
    #[must_use]
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    /// Sets temperature and token budget.
    #[must_use]
    pub const fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the bound on tool-calling rounds. Clamped to at least one.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// The persona.
    #[must_use]
    pub const fn role(&self) -> AgentRole {
        self.role
    }

    /// The bound tools.
    #[must_use]
    pub const fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Runs the task described by `prompt` and returns the final answer.
    ///
    /// Tool failures are fed back to the model as `[tool_error]` text.
    /// Model failures and an empty final answer are errors.
    pub async fn run(&self, prompt: &str, ctx: &StageContext) -> Result<String, CrewflowError> {
        let mut messages = vec![
            ChatMessage::system(self.role.system_prompt()),
            ChatMessage::user(prompt),
        ];
        let schemas = self.tools.openai_schemas();

        for iteration in 1..=self.max_iterations {
            let request = LlmRequest::new(messages.clone())
                .with_tools(schemas.clone())
                .with_generation(self.temperature, self.max_tokens);
            let response = self.llm.complete(request).await?;

            if !response.has_tool_calls() {
                debug!(role = %self.role, iteration, "Agent answered");
                return self.final_answer(ctx, response.content);
            }

            debug!(
                role = %self.role,
                iteration,
                calls = response.tool_calls.len(),
                "Agent requested tools"
            );
            messages.push(ChatMessage::assistant(
                response.content,
                response.tool_calls.clone(),
            ));
            self.answer_tool_calls(ctx, &response.tool_calls, &mut messages)
                .await;
        }

        info!(
            role = %self.role,
            max_iterations = self.max_iterations,
            "Tool budget exhausted, requesting final answer"
        );
        messages.push(ChatMessage::user(FINAL_ANSWER_PROMPT));
        let request =
            LlmRequest::new(messages).with_generation(self.temperature, self.max_tokens);
        let response = self.llm.complete(request).await?;
        self.final_answer(ctx, response.content)
    }

    /// Executes the calls of one response concurrently. Replies keep call order.
    async fn answer_tool_calls(
        &self,
        ctx: &StageContext,
        calls: &[serde_json::Value],
        messages: &mut Vec<ChatMessage>,
    ) {
        let run_id = ctx.run_id();
        let resolutions = self.tools.parse_and_resolve(calls);
        let replies = join_all(
            resolutions
                .into_iter()
                .map(|resolution| self.answer_tool_call(resolution)),
        )
        .await;

        for reply in replies {
            ctx.try_emit_event(&StageEvent::tool_invoked(
                &run_id,
                ctx.stage_name(),
                &reply.tool,
                reply.ok,
            ));
            messages.push(ChatMessage::tool(reply.call_id, reply.content));
        }
    }

    async fn answer_tool_call(
        &self,
        resolution: Result<ResolvedToolCall, UnresolvedToolCall>,
    ) -> ToolReply {
        match resolution {
            Ok(call) => match self.tools.execute(&call).await {
                Ok(output) => ToolReply {
                    ok: output.success,
                    content: output.to_message_content(),
                    call_id: call.id,
                    tool: call.name,
                },
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Tool call failed");
                    ToolReply {
                        ok: false,
                        content: format!("{TOOL_ERROR_MARKER} {e}"),
                        call_id: call.id,
                        tool: call.name,
                    }
                }
            },
            Err(unresolved) => {
                warn!(
                    tool = unresolved.name.as_deref().unwrap_or("<unknown>"),
                    error = %unresolved.error,
                    "Unresolvable tool call"
                );
                ToolReply {
                    ok: false,
                    content: format!("{TOOL_ERROR_MARKER} {}", unresolved.error),
                    call_id: unresolved.id.unwrap_or_default(),
                    tool: unresolved.name.unwrap_or_default(),
                }
            }
        }
    }

    fn final_answer(&self, ctx: &StageContext, content: String) -> Result<String, CrewflowError> {
        let answer = content.trim();
        if answer.is_empty() {
            return Err(CrewflowError::stage(
                ctx.stage_name(),
                format!("{} returned an empty answer", self.role),
            ));
        }
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{PipelineContext, RunIdentity, StageInputs};
    use crate::errors::{LlmError, ToolError};
    use crate::events::CollectingEventSink;
    use crate::llm::{LlmResponse, Role, ScriptedLlm};
    use crate::tools::{tool_call, Tool, ToolDefinition, ToolOutput};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("upper")
        }

        async fn call(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
            let text = arguments["text"]
                .as_str()
                .ok_or_else(|| ToolError::invalid_arguments("upper", "missing 'text'"))?;
            Ok(ToolOutput::ok(serde_json::json!(text.to_uppercase())))
        }
    }

    fn stage_ctx(sink: Arc<CollectingEventSink>) -> StageContext {
        let pipeline = PipelineContext::new(RunIdentity::new(), "topic").with_event_sink(sink);
        StageContext::new(Arc::new(pipeline), "research", StageInputs::new("topic"))
    }

    fn tools() -> Arc<ToolRegistry> {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool));
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_plain_answer_is_trimmed() {
        let llm = Arc::new(ScriptedLlm::new("m").with_text("  notes \n"));
        let agent = Agent::new(AgentRole::Writer, llm.clone()).with_generation(0.5, 300);

        let answer = agent
            .run("write", &stage_ctx(Arc::new(CollectingEventSink::new())))
            .await
            .unwrap();
        assert_eq!(answer, "notes");

        let request = &llm.requests()[0];
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(300));
        assert!(request.tools.is_empty());
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back() {
        let llm = Arc::new(
            ScriptedLlm::new("m")
                .with_response(LlmResponse::with_tool_calls(vec![
                    tool_call("c1", "upper", &serde_json::json!({"text": "abc"})),
                    tool_call("c2", "missing", &serde_json::json!({})),
                    tool_call("c3", "upper", &serde_json::json!({})),
                ]))
                .with_text("done"),
        );
        let sink = Arc::new(CollectingEventSink::new());
        let agent = Agent::new(AgentRole::Researcher, llm.clone()).with_tools(tools());

        let answer = agent.run("research", &stage_ctx(sink.clone())).await.unwrap();
        assert_eq!(answer, "done");

        let second = &llm.requests()[1];
        let tool_messages: Vec<_> = second
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        assert_eq!(tool_messages.len(), 3);
        assert_eq!(tool_messages[0].content, "ABC");
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("c1"));
        assert!(tool_messages[1].content.starts_with("[tool_error] No tool registered"));
        assert!(tool_messages[2].content.starts_with("[tool_error]"));
        assert_eq!(llm.requests()[0].tools.len(), 1);

        let events = sink.events_of_type("tool.invoked");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].data["ok"], serde_json::json!(true));
        assert_eq!(events[1].data["ok"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_forces_final_answer() {
        let call = || {
            LlmResponse::with_tool_calls(vec![tool_call(
                "c",
                "upper",
                &serde_json::json!({"text": "x"}),
            )])
        };
        let llm = Arc::new(
            ScriptedLlm::new("m")
                .with_response(call())
                .with_response(call())
                .with_text("final"),
        );
        let agent = Agent::new(AgentRole::Researcher, llm.clone())
            .with_tools(tools())
            .with_max_iterations(2);

        let answer = agent
            .run("research", &stage_ctx(Arc::new(CollectingEventSink::new())))
            .await
            .unwrap();
        assert_eq!(answer, "final");

        let requests = llm.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].tools.is_empty());
        assert_eq!(requests[2].last_user_message(), Some(FINAL_ANSWER_PROMPT));
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let llm = Arc::new(ScriptedLlm::new("m").with_text("   "));
        let agent = Agent::new(AgentRole::Reviewer, llm);

        let err = agent
            .run("review", &stage_ctx(Arc::new(CollectingEventSink::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, CrewflowError::StageExecution { .. }));
        assert!(err.to_string().contains("empty answer"));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let llm = Arc::new(ScriptedLlm::new("m").with_error(LlmError::Http {
            status: 401,
            body: "unauthorized".to_string(),
        }));
        let agent = Agent::new(AgentRole::Writer, llm);

        let err = agent
            .run("write", &stage_ctx(Arc::new(CollectingEventSink::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, CrewflowError::Llm(LlmError::Http { status: 401, .. })));
    }
}
