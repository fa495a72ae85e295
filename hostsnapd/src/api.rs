use crate::capture::{CaptureLimits, CommandRunner, CommandSpec, SystemRunner, default_commands};
use crate::config::Config;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::render::{PageRenderer, RenderError, render_json};
use crate::snapshot::{Snapshot, take_snapshot};
use crate::ui;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{debug, error};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub runner: Arc<dyn CommandRunner>,
    pub commands: Vec<CommandSpec>,
    pub limits: CaptureLimits,
    pub renderer: PageRenderer,
    pub metrics: Arc<Metrics>,
    pub static_dir: PathBuf,
}

impl AppState {
    /// State for the daemon: real processes, the fixed command pair.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            runner: Arc::new(SystemRunner),
            commands: default_commands(),
            limits: cfg.capture.limits(),
            renderer: PageRenderer::new(cfg.page.title.clone()),
            metrics: Arc::new(Metrics::new()),
            static_dir: cfg.server.static_dir.clone(),
        }
    }

    async fn snapshot(&self) -> Snapshot {
        self.metrics.inc_requests();
        let started = Instant::now();
        let snapshot = take_snapshot(
            self.runner.as_ref(),
            &self.commands,
            &self.limits,
            &self.metrics,
        )
        .await;
        debug!(
            "[api] snapshot of {} commands in {} ms ({} failed)",
            snapshot.slots.len(),
            started.elapsed().as_millis(),
            snapshot.failures()
        );
        snapshot
    }
}

/// Only template assembly failures reach the client as errors.
#[derive(Debug)]
pub struct ApiError(RenderError);

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to render snapshot: {}", self.0),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(snapshot_page))
        .route("/index.html", get(snapshot_page))
        .route("/snapshot.json", get(snapshot_json))
        .route("/healthz", get(healthz))
        .route("/status", get(status))
        .route("/starter-template.css", get(ui::stylesheet_handler))
        .route("/logo.png", get(logo))
        .with_state(state)
}

async fn snapshot_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let snapshot = state.snapshot().await;
    state
        .renderer
        .render_snapshot(&snapshot)
        .map(Html)
        .map_err(|err| render_failed(&state, err))
}

async fn snapshot_json(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let snapshot = state.snapshot().await;
    let body = render_json(&snapshot).map_err(|err| render_failed(&state, err))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

fn render_failed(state: &AppState, err: RenderError) -> ApiError {
    error!("[api] {err}");
    state.metrics.inc_render_errors();
    ApiError::from(err)
}

async fn logo(State(state): State<Arc<AppState>>) -> Response {
    ui::static_file(&state.static_dir, ui::LOGO_FILE, "image/png").await
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct StatusResponse {
    version: &'static str,
    timeout_ms: u64,
    max_output_bytes: usize,
    commands: Vec<String>,
    #[serde(flatten)]
    metrics: MetricsSnapshot,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        timeout_ms: state.limits.timeout.as_millis() as u64,
        max_output_bytes: state.limits.max_output_bytes,
        commands: state.commands.iter().map(CommandSpec::command_line).collect(),
        metrics: state.metrics.snapshot(),
    })
}
