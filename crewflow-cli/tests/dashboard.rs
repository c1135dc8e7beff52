use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use crewflow::config::CrewConfig;
use crewflow::errors::LlmError;
use crewflow::llm::{EchoLlm, ScriptedLlm};
use crewflow_cli::dashboard::{create_router, DashboardState};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn echo_state(dir: &TempDir) -> Arc<DashboardState> {
    let config = CrewConfig::default().with_output_dir(dir.path());
    Arc::new(DashboardState::new(config).with_llm(Arc::new(EchoLlm)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/run")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(create_router(echo_state(&dir)), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_index_shows_form() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(create_router(echo_state(&dir)), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form method=\"post\" action=\"/run\">"));
    assert!(body.contains("LLM observability best practices"));
    assert!(body.contains("Show generated files"));
}

#[tokio::test]
async fn test_blank_topic_is_rejected_without_a_run() {
    let dir = TempDir::new().unwrap();
    let state = echo_state(&dir);
    let (status, body) = send(create_router(Arc::clone(&state)), post_form("topic=++")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Please enter a topic."));
    assert!(state.runs().is_empty());
}

#[tokio::test]
async fn test_bad_form_value_is_reported() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(
        create_router(echo_state(&dir)),
        post_form("topic=rust&max_tokens=10"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Max tokens must be between 256 and 8192."));
}

#[tokio::test]
async fn test_successful_run_renders_article_and_is_listed() {
    let dir = TempDir::new().unwrap();
    let state = echo_state(&dir);

    let (status, body) = send(
        create_router(Arc::clone(&state)),
        post_form("topic=Rust+async&show_files=on"),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains("Final Article"));
    assert!(body.contains("<summary>Research Notes</summary>"));
    assert!(body.contains("final.md"));

    let runs = state.runs();
    assert_eq!(runs.len(), 1);
    let final_path = runs[0].final_path.clone().unwrap();
    assert!(final_path.starts_with(dir.path().join("runs").join(runs[0].run_id.to_string())));
    assert!(final_path.exists());

    let (status, body) = send(create_router(state), get("/api/runs")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["topic"], "Rust async");
    assert_eq!(json[0]["status"], "succeeded");

    let event_types: Vec<&str> = json[0]["events"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|event| event["type"].as_str())
        .collect();
    assert_eq!(event_types.first(), Some(&"pipeline.started"));
    assert_eq!(event_types.last(), Some(&"pipeline.completed"));
    assert_eq!(event_types.iter().filter(|t| **t == "stage.completed").count(), 3);
}

#[tokio::test]
async fn test_unchecked_show_files_hides_notes_and_draft() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(create_router(echo_state(&dir)), post_form("topic=rust")).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains("Final Article"));
    assert!(!body.contains("<summary>Research Notes</summary>"));
    assert!(!body.contains("<summary>Draft</summary>"));
    assert!(body.contains("<summary>Timeline</summary>"));
}

#[tokio::test]
async fn test_old_runs_and_their_artifacts_are_pruned() {
    let dir = TempDir::new().unwrap();
    let config = CrewConfig::default().with_output_dir(dir.path());
    let state = Arc::new(
        DashboardState::new(config)
            .with_llm(Arc::new(EchoLlm))
            .with_max_history(1),
    );

    send(create_router(Arc::clone(&state)), post_form("topic=first")).await;
    let first = state.runs().remove(0);
    assert!(first.output_dir.exists());

    send(create_router(Arc::clone(&state)), post_form("topic=second")).await;
    let runs = state.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].topic, "second");
    assert!(!first.output_dir.exists());
    assert!(runs[0].output_dir.exists());
}

#[tokio::test]
async fn test_failed_run_shows_error() {
    let dir = TempDir::new().unwrap();
    let llm = ScriptedLlm::new("scripted").with_error(LlmError::Http {
        status: 400,
        body: "model not found".to_string(),
    });
    let config = CrewConfig::default().with_output_dir(dir.path());
    let state = Arc::new(DashboardState::new(config).with_llm(Arc::new(llm)));

    let (status, body) = send(create_router(Arc::clone(&state)), post_form("topic=rust")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Run failed"));
    assert!(body.contains("model not found"));

    let runs = state.runs();
    assert_eq!(runs.len(), 1);
    assert!(runs[0].error.as_deref().unwrap().contains("model not found"));
}
