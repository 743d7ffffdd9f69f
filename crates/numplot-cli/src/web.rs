//! HTTP front end: the form page, the image route and a small JSON API.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use numplot_core::{
    analyze, parse_samples, AnalysisOptions, Method, NumError, Outcome, PlotRecord, PlotStore,
    Series,
};
use numplot_store::{legend, PngStore};

use crate::page::{self, PageView, ResultView};

pub struct AppState {
    pub store: PngStore,
    pub opts: AnalysisOptions,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/process", post(process_handler))
        .route("/procesar", post(process_handler))
        .route("/static/img/{name}", get(image_handler))
        .route("/api/v1/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn serve(host: &str, port: u16, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("binding {host}:{port}"))?;
    info!(host = %host, port = %port, image_dir = %state.store.dir().display(), "server listening");
    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared processing
// ---------------------------------------------------------------------------

/// Parse, analyze and (when a method matched) save the plot. Rendering blocks,
/// so this runs on the blocking pool.
async fn run_analysis(
    state: Arc<AppState>,
    data: String,
    method: String,
) -> Result<(Outcome, Option<PlotRecord>), NumError> {
    let joined = tokio::task::spawn_blocking(move || -> Result<_, NumError> {
        let samples = parse_samples(&data)?;
        let outcome = analyze(&samples, &method, &state.opts)?;
        let record = match outcome.analysis() {
            Some(a) => Some(state.store.save(a)?),
            None => None,
        };
        Ok((outcome, record))
    })
    .await;

    match joined {
        Ok(res) => res,
        Err(e) => Err(NumError::Plot(format!("worker failed: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Form page
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProcessForm {
    #[serde(default, alias = "datos")]
    data: String,
    #[serde(default, alias = "metodo")]
    method: String,
}

async fn index_handler() -> Html<String> {
    Html(page::render(&PageView::default()))
}

async fn process_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ProcessForm>,
) -> Html<String> {
    let result = match run_analysis(state, form.data.clone(), form.method.clone()).await {
        Ok((outcome, record)) => ResultView {
            summary: outcome.summary().to_string(),
            image: record.map(|r| r.name),
            legend: outcome.analysis().map(legend).unwrap_or_default(),
        },
        Err(e) => {
            warn!(method = %form.method, "analysis failed: {e}");
            ResultView {
                summary: format!("Error: {e}"),
                ..Default::default()
            }
        }
    };

    Html(page::render(&PageView {
        data: form.data,
        method: form.method,
        result: Some(result),
    }))
}

async fn image_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.store.open(&name) {
        Ok(Some(bytes)) => {
            let mime = mime_guess::from_path(&name).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "image not found").into_response(),
        Err(NumError::InvalidName(_)) => {
            (StatusCode::BAD_REQUEST, "invalid image name").into_response()
        }
        Err(e) => {
            error!("reading image {name}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    data: String,
    method: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    method: Option<Method>,
    summary: String,
    series: Vec<Series>,
    image: Option<String>,
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<Value>)> {
    let (outcome, record) = run_analysis(state, req.data, req.method)
        .await
        .map_err(|e| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    let analysis = outcome.analysis();
    Ok(Json(AnalyzeResponse {
        method: analysis.map(|a| a.method()),
        summary: outcome.summary().to_string(),
        series: analysis.map(|a| a.series().to_vec()).unwrap_or_default(),
        image: record.map(|r| format!("/static/img/{}", r.name)),
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
