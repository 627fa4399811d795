use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tower_http::cors::CorsLayer;

use super::api::{self, AppState};
use super::embedded::Assets;
use crate::config::Config;
use crate::controller::ProjectController;
use crate::supervisor::Supervisor;

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            dev_mode: false,
        }
    }
}

/// Build the full application router: JSON API plus dashboard assets.
pub fn build_router(state: Arc<AppState>) -> Router {
    api::api_router()
        .fallback(static_handler)
        .with_state(state)
}

/// Serve an embedded dashboard asset. `/` maps to `index.html`; anything
/// that is not an asset is a plain 404.
async fn static_handler(req: Request<Body>) -> impl IntoResponse {
    let path = req.uri().path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Start the dashboard server and block until Ctrl+C.
pub async fn start_server(config: &Config, server: ServerConfig) -> Result<()> {
    let controller = ProjectController::new(
        config.projects_dir.clone(),
        Supervisor::from_config(config),
    );
    let state = Arc::new(AppState::new(controller));

    let mut app = build_router(state);
    if server.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        projects_dir = %config.projects_dir.display(),
        "dashboard listening"
    );
    println!("Dashboard: http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
