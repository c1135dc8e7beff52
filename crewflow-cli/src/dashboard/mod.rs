//! Web dashboard for running the crew from a browser.
//!
//! # Endpoints
//!
//! - `GET /` - Run form
//! - `POST /run` - Run the pipeline and render the final article
//! - `GET /api/runs` - Runs served by this process
//! - `GET /health` - Health check

mod render;
mod routes;

pub use render::{escape_html, markdown_to_html};
pub use routes::RunForm;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use crewflow::config::CrewConfig;
use crewflow::core::StageEvent;
use crewflow::llm::LlmClient;
use crewflow::websearch::SearchProvider;
use dashmap::DashMap;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Outcome of a dashboard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// All three artifacts were written.
    Succeeded,
    /// The run was rejected or aborted.
    Failed,
}

/// One run served by this process.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// Run ID; also the artifact directory name.
    pub run_id: Uuid,
    /// The topic as submitted.
    pub topic: String,
    /// Provider used.
    pub provider: String,
    /// Model used.
    pub model: String,
    /// Outcome.
    pub status: RunStatus,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Path of the final article, when the run succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_path: Option<PathBuf>,
    /// Error text, when the run failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Directory holding the run's artifacts.
    pub output_dir: PathBuf,
    /// Lifecycle events of the run, in emission order.
    pub events: Vec<StageEvent>,
}

/// Runs kept in the dashboard history by default.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Shared dashboard state.
///
/// Only the newest `max_history` runs are kept. Older records are evicted
/// on insert and their artifact directories are deleted by the run handler.
pub struct DashboardState {
    config: CrewConfig,
    llm: Option<Arc<dyn LlmClient>>,
    search_provider: Option<Arc<dyn SearchProvider>>,
    runs: DashMap<Uuid, RunRecord>,
    max_history: usize,
    start_time: Instant,
}

impl DashboardState {
    /// Creates state whose runs start from `config`.
    #[must_use]
    pub fn new(config: CrewConfig) -> Self {
        Self {
            config,
            llm: None,
            search_provider: None,
            runs: DashMap::new(),
            max_history: DEFAULT_MAX_HISTORY,
            start_time: Instant::now(),
        }
    }

    /// Uses `llm` for every run instead of the configured provider.
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

    /// Keeps at most `max_history` runs (at least one).
    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self
    }

    /// The configuration runs start from.
    #[must_use]
    pub const fn config(&self) -> &CrewConfig {
        &self.config
    }

    /// Records a run and returns the records evicted to stay within the
    /// history limit, oldest first.
    pub fn record(&self, record: RunRecord) -> Vec<RunRecord> {
        self.runs.insert(record.run_id, record);

        let mut evicted = Vec::new();
        while self.runs.len() > self.max_history {
            let oldest = self
                .runs
                .iter()
                .min_by_key(|entry| entry.value().started_at)
                .map(|entry| *entry.key());
            let Some((_, record)) = oldest.and_then(|run_id| self.runs.remove(&run_id)) else {
                break;
            };
            evicted.push(record);
        }
        evicted
    }

    /// Runs served so far, newest first.
    #[must_use]
    pub fn runs(&self) -> Vec<RunRecord> {
        let mut runs: Vec<RunRecord> = self.runs.iter().map(|entry| entry.value().clone()).collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs
    }

    /// Seconds since the dashboard started.
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Creates the dashboard router.
pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/run", post(routes::run))
        .route("/api/runs", get(routes::list_runs))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the dashboard on `addr` until the process is stopped.
pub async fn serve(state: Arc<DashboardState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Dashboard listening");

    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(minutes_ago: i64) -> RunRecord {
        RunRecord {
            run_id: Uuid::new_v4(),
            topic: format!("topic {minutes_ago}"),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            status: RunStatus::Succeeded,
            started_at: Utc::now() - Duration::minutes(minutes_ago),
            duration_ms: 1,
            final_path: None,
            error: None,
            output_dir: PathBuf::from("outputs"),
            events: Vec::new(),
        }
    }

    #[test]
    fn test_history_evicts_oldest_runs() {
        let state = DashboardState::new(CrewConfig::default()).with_max_history(2);

        assert!(state.record(record(30)).is_empty());
        assert!(state.record(record(10)).is_empty());
        let evicted = state.record(record(20));

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].topic, "topic 30");
        let topics: Vec<String> = state.runs().into_iter().map(|run| run.topic).collect();
        assert_eq!(topics, vec!["topic 10", "topic 20"]);
    }

    #[test]
    fn test_history_keeps_at_least_one_run() {
        let state = DashboardState::new(CrewConfig::default()).with_max_history(0);
        state.record(record(2));
        state.record(record(1));
        assert_eq!(state.runs().len(), 1);
    }
}
