use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::controller::ProjectController;
use crate::errors::ControlError;
use crate::tail::{DEFAULT_EVENT_TAIL, DEFAULT_LOG_TAIL};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub controller: Arc<ProjectController>,
}

impl AppState {
    pub fn new(controller: ProjectController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }

    /// Run a controller operation on a blocking thread. Controller calls do
    /// file I/O, take advisory locks and may spawn or signal processes.
    pub async fn call<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&ProjectController) -> Result<R, ControlError> + Send + 'static,
        R: Send + 'static,
    {
        let controller = self.controller.clone();
        tokio::task::spawn_blocking(move || f(&controller))
            .await
            .context("Controller task panicked")
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(ApiError::from)
    }
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TailQuery {
    pub tail: Option<i64>,
}

#[derive(Deserialize)]
pub struct FileQuery {
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct IntakeRequest {
    pub answers: String,
}

#[derive(Deserialize)]
pub struct InteractionRequest {
    pub notes: Option<String>,
    pub interactive_mode: Option<bool>,
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match &err {
            ControlError::ProjectNotFound { .. } | ControlError::ContentNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            ControlError::InvalidPath(reason) => {
                tracing::debug!(reason = %reason, "rejected content path");
                ApiError::BadRequest(err.to_string())
            }
            ControlError::ContentNotText { .. } => ApiError::BadRequest(err.to_string()),
            _ => {
                tracing::error!(error = %err, "controller operation failed");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

// Malformed query strings and bodies get the same `{"error": ...}` document
// as every other failure instead of axum's plain-text rejection.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{name}/state", get(get_state))
        .route("/api/projects/{name}/tasks", get(get_tasks))
        .route("/api/projects/{name}/logs", get(get_logs))
        .route("/api/projects/{name}/events", get(get_events))
        .route(
            "/api/projects/{name}/intake",
            get(get_intake).post(submit_intake),
        )
        .route(
            "/api/projects/{name}/interaction",
            get(get_interaction).post(update_interaction),
        )
        .route(
            "/api/projects/{name}/interaction/pause",
            post(request_interrupt),
        )
        .route(
            "/api/projects/{name}/interaction/continue",
            post(continue_after_interrupt),
        )
        .route("/api/projects/{name}/review", get(get_review))
        .route(
            "/api/projects/{name}/review/continue",
            post(continue_after_review),
        )
        .route("/api/projects/{name}/file", get(get_file))
        .route("/api/projects/{name}/pause", post(pause))
        .route("/api/projects/{name}/resume", post(resume))
        .route("/api/projects/{name}/run", post(trigger_run))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_projects(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let projects = state.call(|c| Ok(c.list_projects())).await?;
    Ok(Json(serde_json::json!({ "projects": projects })))
}

async fn get_state(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.call(move |c| c.state(&name)).await?;
    Ok(Json(record))
}

async fn get_tasks(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ledger = state.call(move |c| c.tasks(&name)).await?;
    Ok(Json(ledger))
}

async fn get_logs(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    query: Result<Query<TailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let tail = query.tail.unwrap_or(DEFAULT_LOG_TAIL);
    let logs = state.call(move |c| c.logs(&name, tail)).await?;
    Ok(Json(logs))
}

async fn get_events(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    query: Result<Query<TailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let tail = query.tail.unwrap_or(DEFAULT_EVENT_TAIL);
    let events = state.call(move |c| c.events(&name, tail)).await?;
    Ok(Json(events))
}

async fn get_intake(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let intake = state.call(move |c| c.intake(&name)).await?;
    Ok(Json(intake))
}

async fn submit_intake(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    req: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = req?;
    let record = state
        .call(move |c| c.submit_intake(&name, &req.answers))
        .await?;
    Ok(Json(record))
}

async fn get_interaction(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.call(move |c| c.interaction(&name)).await?;
    Ok(Json(view))
}

async fn update_interaction(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    req: Result<Json<InteractionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = req?;
    let view = state
        .call(move |c| c.update_interaction(&name, req.notes.as_deref(), req.interactive_mode))
        .await?;
    Ok(Json(view))
}

async fn request_interrupt(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.call(move |c| c.request_interrupt(&name)).await?;
    Ok(Json(record))
}

async fn continue_after_interrupt(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.call(move |c| c.continue_after_interrupt(&name)).await?;
    Ok(Json(record))
}

async fn get_review(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let review = state.call(move |c| c.review(&name)).await?;
    Ok(Json(review))
}

async fn continue_after_review(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.call(move |c| c.continue_after_review(&name)).await?;
    Ok(Json(record))
}

async fn get_file(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let path = query.path.unwrap_or_default();
    let file = state.call(move |c| c.file(&name, &path)).await?;
    Ok(Json(file))
}

async fn pause(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.call(move |c| c.pause(&name)).await?;
    Ok(Json(record))
}

async fn resume(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.call(move |c| c.resume(&name)).await?;
    Ok(Json(record))
}

async fn trigger_run(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let triggered = state.call(move |c| c.trigger_run(&name)).await?;
    Ok((StatusCode::ACCEPTED, Json(triggered)))
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::testing::FakeLauncher;
    use crate::supervisor::{Supervisor, WorkerCommand};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("novel");
        fs::create_dir_all(project.join("notes")).unwrap();
        fs::create_dir_all(project.join("logs")).unwrap();
        let supervisor = Supervisor::new(
            Arc::new(FakeLauncher::new()),
            WorkerCommand {
                program: "./tick.sh".into(),
                args: Vec::new(),
                cwd: dir.path().to_path_buf(),
            },
            Duration::from_secs(20),
        );
        let controller = ProjectController::new(dir.path().to_path_buf(), supervisor);
        let state = Arc::new(AppState::new(controller));
        (api_router().with_state(state), dir)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(body: Body) -> T {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _dir) = test_app();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_list_projects() {
        let (app, dir) = test_app();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::create_dir(dir.path().join("atlas")).unwrap();

        let response = app.oneshot(get("/api/projects")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["projects"], serde_json::json!(["atlas", "novel"]));
    }

    #[tokio::test]
    async fn test_unknown_project_returns_404_document() {
        let (app, _dir) = test_app();
        let response = app.oneshot(get("/api/projects/ghost/state")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["error"], "project not found");
    }

    #[tokio::test]
    async fn test_hidden_project_name_returns_404() {
        let (app, dir) = test_app();
        fs::create_dir(dir.path().join(".secret")).unwrap();
        let response = app.oneshot(get("/api/projects/.secret/state")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let (app, _dir) = test_app();
        let response = app.oneshot(get("/api/projects/novel/bogus")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_state_of_fresh_project_is_empty_record() {
        let (app, _dir) = test_app();
        let response = app.oneshot(get("/api/projects/novel/state")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert!(body["state"].is_null());
        assert!(body["auto_run_pid"].is_null());
    }

    #[tokio::test]
    async fn test_state_returns_worker_record_as_written() {
        let (app, dir) = test_app();
        fs::write(
            dir.path().join("novel/STATE.json"),
            r#"{"state":"RUNNING","run_id":42,"role":"writer","chapter":3}"#,
        )
        .unwrap();

        let response = app.oneshot(get("/api/projects/novel/state")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(
            body,
            serde_json::json!({"state":"RUNNING","run_id":42,"role":"writer","chapter":3})
        );
    }

    #[tokio::test]
    async fn test_pause_then_resume() {
        let (app, _dir) = test_app();

        let response = app
            .clone()
            .oneshot(post_empty("/api/projects/novel/pause"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "PAUSED");
        assert!(body["role"].is_null());

        let response = app
            .oneshot(post_empty("/api/projects/novel/resume"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "INTAKE_READY");
    }

    #[tokio::test]
    async fn test_tasks_summary() {
        let (app, dir) = test_app();
        fs::write(
            dir.path().join("novel/TASKS.yaml"),
            "- id: 1\n  title: Outline\n  status: pending\n- id: 2\n  title: Draft\n  status: done\n- id: 3\n  title: Edit\n  status: pending\n",
        )
        .unwrap();

        let response = app.oneshot(get("/api/projects/novel/tasks")).await.unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["done"], 1);
        assert_eq!(body["items"][1]["title"], "Draft");
    }

    #[tokio::test]
    async fn test_logs_without_files_returns_nulls() {
        let (app, _dir) = test_app();
        let response = app.oneshot(get("/api/projects/novel/logs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert!(body["file"].is_null());
        assert!(body["size"].is_null());
        assert_eq!(body["tail"], 200);
        assert_eq!(body["lines"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_logs_tail_query() {
        let (app, dir) = test_app();
        fs::write(dir.path().join("novel/logs/tick.log"), "a\nb\nc\n").unwrap();
        let response = app
            .oneshot(get("/api/projects/novel/logs?tail=2"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["file"], "tick.log");
        assert_eq!(body["lines"], serde_json::json!(["b", "c"]));
        assert_eq!(body["size"], 6);
    }

    #[tokio::test]
    async fn test_events_default_and_zero_tail() {
        let (app, dir) = test_app();
        fs::write(
            dir.path().join("novel/logs/events.ndjson"),
            "{\"event\":\"tick_start\"}\ngarbage\n{\"event\":\"tick_end\"}\n",
        )
        .unwrap();

        let response = app
            .clone()
            .oneshot(get("/api/projects/novel/events"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["tail"], 50);
        assert_eq!(body["events"].as_array().unwrap().len(), 2);

        let response = app
            .oneshot(get("/api/projects/novel/events?tail=0"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["events"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_intake_roundtrip() {
        let (app, dir) = test_app();
        fs::write(
            dir.path().join("novel/notes/intake_questions.md"),
            "What genre?",
        )
        .unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/projects/novel/intake",
                serde_json::json!({"answers": "Space opera"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "INTAKE_READY");

        let response = app.oneshot(get("/api/projects/novel/intake")).await.unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["questions"], "What genre?");
        assert_eq!(body["answers"], "Space opera");
    }

    #[tokio::test]
    async fn test_intake_requires_answers() {
        let (app, _dir) = test_app();
        let response = app
            .oneshot(post_json("/api/projects/novel/intake", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert!(body["error"].as_str().unwrap().contains("answers"));
    }

    #[tokio::test]
    async fn test_interaction_malformed_body_is_error_document() {
        let (app, _dir) = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/projects/novel/interaction")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_numeric_tail_is_error_document() {
        let (app, _dir) = test_app();
        for uri in [
            "/api/projects/novel/logs?tail=abc",
            "/api/projects/novel/events?tail=abc",
        ] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: serde_json::Value = body_json(response.into_body()).await;
            assert!(body["error"].is_string(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_interaction_toggle_from_review() {
        let (app, dir) = test_app();
        fs::write(
            dir.path().join("novel/STATE.json"),
            r#"{"state": "REVIEW_READY", "interactive_mode": true}"#,
        )
        .unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/projects/novel/interaction",
                serde_json::json!({"notes": "Tighten chapter two.", "interactive_mode": false}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "DEV_READY");
        assert!(body["resume_state"].is_null());
        assert_eq!(body["interactive_mode"], false);
        assert_eq!(body["notes"], "Tighten chapter two.");

        let response = app.oneshot(get("/api/projects/novel/state")).await.unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["auto_run"], true);
    }

    #[tokio::test]
    async fn test_interrupt_pause_and_continue() {
        let (app, dir) = test_app();
        fs::write(
            dir.path().join("novel/STATE.json"),
            r#"{"state": "DEV_READY"}"#,
        )
        .unwrap();
        let flag = dir.path().join("novel/notes/interrupt.flag");

        let response = app
            .clone()
            .oneshot(post_empty("/api/projects/novel/interaction/pause"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "PAUSE_INTERACT");
        assert_eq!(body["resume_state"], "DEV_READY");
        assert!(flag.exists());

        let response = app
            .oneshot(post_empty("/api/projects/novel/interaction/continue"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "DEV_READY");
        assert!(body["resume_state"].is_null());
        assert!(!flag.exists());
    }

    #[tokio::test]
    async fn test_review_and_continue() {
        let (app, dir) = test_app();
        fs::write(
            dir.path().join("novel/STATE.json"),
            r#"{"state": "REVIEW_WAITING", "review_items": ["chapters/01.md"]}"#,
        )
        .unwrap();

        let response = app
            .clone()
            .oneshot(get("/api/projects/novel/review"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "REVIEW_WAITING");
        assert_eq!(body["items"], serde_json::json!(["chapters/01.md"]));

        let response = app
            .oneshot(post_empty("/api/projects/novel/review/continue"))
            .await
            .unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["state"], "DEV_READY");
        assert_eq!(body["review_items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_file_serves_sandboxed_content() {
        let (app, dir) = test_app();
        fs::write(dir.path().join("novel/notes/ok.md"), "# Notes\n").unwrap();

        let response = app
            .clone()
            .oneshot(get("/api/projects/novel/file?path=notes/ok.md"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["content"], "# Notes\n");

        for bad in ["../secret.md", "/etc/passwd", "notes/x.txt", ""] {
            let uri = format!("/api/projects/novel/file?path={}", bad);
            let response = app.clone().oneshot(get(&uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "path {:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_file_missing_param_is_bad_request() {
        let (app, _dir) = test_app();
        let response = app.oneshot(get("/api/projects/novel/file")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_run_is_accepted_without_state_change() {
        let (app, dir) = test_app();
        let response = app
            .oneshot(post_empty("/api/projects/novel/run"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["project"], "novel");
        assert!(!dir.path().join("novel/STATE.json").exists());
    }
}
