//! The crew runner: topic in, three artifacts out.

use super::{PipelineBuilder, PipelineResult};
use crate::agents::{Agent, AgentRole};
use crate::config::CrewConfig;
use crate::context::{PipelineContext, RunIdentity};
use crate::core::ArtifactLayout;
use crate::errors::CrewflowError;
use crate::events::{EventSink, LoggingEventSink};
use crate::llm::{build_llm_client, LlmClient};
use crate::stages::{build_stage_descriptors, AgentStage};
use crate::tools::{FetchUrlTool, ToolRegistry, WebSearchTool};
use crate::websearch::{Fetcher, SearchProvider, WebSearcher};
use std::sync::Arc;
use tracing::info;

/// Name of the content pipeline.
pub const CREW_PIPELINE: &str = "research-write-review";

/// Builds and runs the Researcher, Writer, Reviewer pipeline.
///
/// Every dependency comes from the [`CrewConfig`] unless overridden with
/// one of the `with_*` methods.
pub struct Crew {
    config: CrewConfig,
    llm: Option<Arc<dyn LlmClient>>,
    search_provider: Option<Arc<dyn SearchProvider>>,
    layout: Option<ArtifactLayout>,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crew")
            .field("config", &self.config)
            .field("llm", &self.llm.as_ref().map(|llm| llm.model_name().to_string()))
            .field("layout", &self.layout())
            .finish_non_exhaustive()
    }
}

impl Crew {
    /// Creates a crew from configuration.
    #[must_use]
    pub fn new(config: CrewConfig) -> Self {
        Self {
            config,
            llm: None,
            search_provider: None,
            layout: None,
            event_sink: Arc::new(LoggingEventSink::debug()),
        }
    }

    /// Uses `llm` instead of the client described by the configuration.
    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Uses `provider` for the researcher's searches.
    #[must_use]
    pub fn with_search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search_provider = Some(provider);
        self
    }

    /// Writes artifacts into `layout` instead of the configured output directory.
    #[must_use]
    pub fn with_layout(mut self, layout: ArtifactLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sends lifecycle events to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &CrewConfig {
        &self.config
    }

    /// The layout artifacts are written into.
    #[must_use]
    pub fn layout(&self) -> ArtifactLayout {
        self.layout
            .clone()
            .unwrap_or_else(|| ArtifactLayout::new(&self.config.output_dir))
    }

    /// Runs the pipeline on `topic`.
    ///
    /// # Errors
    ///
    /// [`CrewflowError::InvalidInput`] for a blank topic (before any model
    /// call), [`CrewflowError::Config`] for invalid configuration, otherwise
    /// the first stage failure.
    pub async fn run(&self, topic: &str) -> Result<PipelineResult, CrewflowError> {
        let topic = normalize_topic(topic)?;
        let ctx = PipelineContext::new(RunIdentity::new(), topic)
            .with_event_sink(Arc::clone(&self.event_sink));
        self.run_with_context(Arc::new(ctx)).await
    }

    /// Runs the pipeline in a caller-owned context, which allows cancelling
    /// the run from another task. The topic is taken from the context.
    ///
    /// # Errors
    ///
    /// Same as [`Crew::run`], plus [`CrewflowError::Cancelled`].
    pub async fn run_with_context(
        &self,
        ctx: Arc<PipelineContext>,
    ) -> Result<PipelineResult, CrewflowError> {
        let topic = normalize_topic(ctx.topic())?;
        self.config.validate()?;

        let layout = self.layout();
        let llm = self
            .llm
            .clone()
            .unwrap_or_else(|| build_llm_client(&self.config));
        info!(
            run_id = %ctx.run().run_id,
            topic = %topic,
            model = llm.model_name(),
            output_dir = %layout.root().display(),
            "Starting crew run"
        );

        let mut builder = PipelineBuilder::new(CREW_PIPELINE);
        for descriptor in build_stage_descriptors(&topic, &layout)? {
            let agent = self.agent(descriptor.role, Arc::clone(&llm));
            builder = builder.stage(Arc::new(AgentStage::new(descriptor, agent)))?;
        }
        let pipeline = builder.build()?;

        let run = pipeline.execute(Arc::clone(&ctx)).await?;
        PipelineResult::from_run(ctx.run().run_id, &run)
    }

    fn agent(&self, role: AgentRole, llm: Arc<dyn LlmClient>) -> Agent {
        let agent = Agent::new(role, llm)
            .with_generation(self.config.temperature, self.config.max_tokens)
            .with_max_iterations(self.config.max_agent_iterations);

        if role.uses_tools() {
            agent.with_tools(self.research_tools())
        } else {
            agent
        }
    }

    fn research_tools(&self) -> Arc<ToolRegistry> {
        let searcher = self.search_provider.as_ref().map_or_else(
            || WebSearcher::from_config(&self.config.search),
            |provider| WebSearcher::new(Arc::clone(provider)),
        );

        let registry = ToolRegistry::new();
        registry.register(Arc::new(WebSearchTool::new(searcher)));
        registry.register(Arc::new(FetchUrlTool::new(Fetcher::new(
            self.config.fetch.clone(),
        ))));
        Arc::new(registry)
    }
}

fn normalize_topic(topic: &str) -> Result<String, CrewflowError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(CrewflowError::InvalidInput(
            "topic must not be empty".to_string(),
        ));
    }
    Ok(topic.to_string())
}
