//! HTTP route handlers for the dashboard.

use super::render::{self, RunPage};
use super::{DashboardState, RunRecord, RunStatus};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use chrono::Utc;
use crewflow::config::{CrewConfig, ModelProvider, MAX_TEMPERATURE};
use crewflow::context::{PipelineContext, RunIdentity};
use crewflow::core::{ArtifactKind, ArtifactLayout};
use crewflow::events::{CollectingEventSink, LoggingEventSink};
use crewflow::pipeline::{Crew, PipelineResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Smallest token budget the form accepts.
pub const MIN_FORM_TOKENS: u32 = 256;
/// Largest token budget the form accepts.
pub const MAX_FORM_TOKENS: u32 = 8192;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<DashboardState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Runs served by this process, newest first.
pub async fn list_runs(State(state): State<Arc<DashboardState>>) -> Json<Vec<RunRecord>> {
    Json(state.runs())
}

/// The run form.
pub async fn index(State(state): State<Arc<DashboardState>>) -> Html<String> {
    Html(render::index_page(state.config(), None))
}

/// Fields of the run form.
///
/// Everything but the topic is optional and falls back to the dashboard's
/// configuration. Numbers arrive as text so bad input gets a readable error.
#[derive(Debug, Default, Deserialize)]
pub struct RunForm {
    /// The topic to research.
    #[serde(default)]
    pub topic: String,
    /// `openai` or `ollama`.
    pub provider: Option<String>,
    /// Model used with OpenAI.
    pub openai_model: Option<String>,
    /// Model used with Ollama.
    pub ollama_model: Option<String>,
    /// Completion token budget.
    pub max_tokens: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<String>,
    /// Checkbox: list the generated files.
    pub show_files: Option<String>,
}

impl RunForm {
    /// Builds the per-request configuration. The process environment is
    /// never touched.
    fn apply(&self, base: &CrewConfig) -> Result<CrewConfig, String> {
        let mut config = base.clone();

        if let Some(provider) = non_blank(self.provider.as_deref()) {
            config.provider = provider
                .parse::<ModelProvider>()
                .map_err(|e| e.to_string())?;
        }
        if let Some(model) = non_blank(self.openai_model.as_deref()) {
            config.openai_model = model.to_string();
        }
        if let Some(model) = non_blank(self.ollama_model.as_deref()) {
            config.ollama_model = model.to_string();
        }
        if let Some(raw) = non_blank(self.max_tokens.as_deref()) {
            let tokens: u32 = raw
                .parse()
                .map_err(|_| format!("Max tokens must be a whole number, got '{raw}'."))?;
            if !(MIN_FORM_TOKENS..=MAX_FORM_TOKENS).contains(&tokens) {
                return Err(format!(
                    "Max tokens must be between {MIN_FORM_TOKENS} and {MAX_FORM_TOKENS}."
                ));
            }
            config.max_tokens = tokens;
        }
        if let Some(raw) = non_blank(self.temperature.as_deref()) {
            let temperature: f32 = raw
                .parse()
                .map_err(|_| format!("Temperature must be a number, got '{raw}'."))?;
            if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
                return Err(format!("Temperature must be between 0.0 and {MAX_TEMPERATURE:.1}."));
            }
            config.temperature = temperature;
        }

        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    fn show_files(&self) -> bool {
        self.show_files.is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Runs the pipeline synchronously and renders the result.
pub async fn run(
    State(state): State<Arc<DashboardState>>,
    Form(form): Form<RunForm>,
) -> Response {
    let topic = form.topic.trim().to_string();
    if topic.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render::index_page(state.config(), Some("Please enter a topic."))),
        )
            .into_response();
    }

    let config = match form.apply(state.config()) {
        Ok(config) => config,
        Err(message) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render::index_page(state.config(), Some(message.as_str()))),
            )
                .into_response();
        }
    };

    let run_id = Uuid::new_v4();
    let layout = ArtifactLayout::run_scoped(&config.output_dir, run_id);
    let output_dir = layout.root().to_path_buf();
    let provider = config.provider.to_string();
    let model = config.model().to_string();
    info!(%run_id, topic = %topic, provider = %provider, model = %model, "Dashboard run requested");

    let mut crew = Crew::new(config).with_layout(layout);
    if let Some(llm) = &state.llm {
        crew = crew.with_llm(Arc::clone(llm));
    }
    if let Some(provider) = &state.search_provider {
        crew = crew.with_search_provider(Arc::clone(provider));
    }

    let started_at = Utc::now();
    let start = Instant::now();
    let events = Arc::new(CollectingEventSink::forwarding_to(Arc::new(LoggingEventSink::info())));
    let ctx = PipelineContext::new(RunIdentity::with_run_id(run_id), topic.clone())
        .with_event_sink(events.clone());
    let outcome = crew.run_with_context(Arc::new(ctx)).await;
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut record = RunRecord {
        run_id,
        topic: topic.clone(),
        provider,
        model,
        status: RunStatus::Succeeded,
        started_at,
        duration_ms,
        final_path: None,
        error: None,
        output_dir,
        events: events.events(),
    };

    match outcome {
        Ok(result) => {
            let research_notes = artifact_text(&result, ArtifactKind::ResearchNotes).await;
            let draft = artifact_text(&result, ArtifactKind::Draft).await;

            record.final_path = Some(result.final_path.clone());
            let page_events = record.events.clone();
            remember(&state, record).await;

            let page = RunPage {
                topic: &topic,
                result: &result,
                research_notes: &research_notes,
                draft: &draft,
                show_files: form.show_files(),
                events: &page_events,
            };
            (StatusCode::OK, Html(render::result_page(&page))).into_response()
        }
        Err(e) => {
            let message = e.to_string();
            warn!(%run_id, error = %message, "Dashboard run failed");

            record.status = RunStatus::Failed;
            record.error = Some(message.clone());
            remember(&state, record).await;

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::error_page(&topic, &message)),
            )
                .into_response()
        }
    }
}

/// Reads an artifact for display, or a notice naming the file that could
/// not be read.
async fn artifact_text(result: &PipelineResult, kind: ArtifactKind) -> String {
    let path = result.path(kind);
    match result.read_artifact(kind).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read artifact");
            format!("Could not read `{}`: {e}", path.display())
        }
    }
}

/// Records the run and deletes the artifact directories of evicted runs.
async fn remember(state: &DashboardState, record: RunRecord) {
    for evicted in state.record(record) {
        match tokio::fs::remove_dir_all(&evicted.output_dir).await {
            Ok(()) => info!(run_id = %evicted.run_id, "Pruned old run artifacts"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                run_id = %evicted.run_id,
                path = %evicted.output_dir.display(),
                error = %e,
                "Could not prune old run artifacts"
            ),
        }
    }
}
