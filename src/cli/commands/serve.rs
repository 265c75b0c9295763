//! HTTP control API for interactive runs.
//!
//! Exposes the processing pipeline and its process manager behind a small
//! request/response boundary, so any UI can drive start/pause/resume/stop
//! and navigate the processed videos.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::cli::Output;
use crate::config::Settings;
use crate::control::{Direction, ProcessManager, ProcessedVideo, RunState};
use crate::persist::CsvOptions;
use crate::pipeline::{Pipeline, ProgressObserver, RunOptions};
use crate::snippet::SnippetMarkers;
use crate::summary::{Summarizer, SummaryProvider};
use crate::youtube::{resolve_input, CaptionClient, PlaylistClient};

/// Caption/summary languages offered to UIs.
const AVAILABLE_LANGUAGES: &[(&str, &str)] = &[
    ("Korean", "ko"),
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Japanese", "ja"),
    ("Chinese", "zh"),
    ("Russian", "ru"),
    ("Portuguese", "pt"),
    ("Italian", "it"),
];

/// Chat models offered to UIs.
const AVAILABLE_MODELS: &[&str] = &[
    "gpt-3.5-turbo",
    "gpt-4",
    "gpt-4-turbo-preview",
    "gpt-3.5-turbo-16k",
];

/// Shared application state.
struct AppState {
    manager: Arc<ProcessManager>,
    settings: Settings,
    api_key: String,
    openai_key: Option<String>,
    running: AtomicBool,
}

/// Run the HTTP control API server.
pub async fn run_serve(
    host: &str,
    port: u16,
    api_key: Option<String>,
    openai_key: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    let api_key = api_key
        .or_else(|| settings.youtube.api_key.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "YouTube API key required (use --api-key, YOUTUBE_API_KEY, or the config file)"
            )
        })?;

    let state = Arc::new(AppState {
        manager: Arc::new(ProcessManager::new()),
        settings,
        api_key,
        openai_key,
        running: AtomicBool::new(false),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/languages", get(languages))
        .route("/models", get(models))
        .route("/process", post(process))
        .route("/control/pause", post(pause))
        .route("/control/resume", post(resume))
        .route("/control/stop", post(stop))
        .route("/status", get(status))
        .route("/navigate", post(navigate))
        .route("/videos/{index}", get(video_at))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Spilliste Control API");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Start run", "POST /process");
    Output::kv("Pause", "POST /control/pause");
    Output::kv("Resume", "POST /control/resume");
    Output::kv("Stop", "POST /control/stop");
    Output::kv("Status", "GET  /status");
    Output::kv("Navigate", "POST /navigate");
    Output::kv("Video by index", "GET  /videos/:index");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessRequest {
    /// Playlist/video URL or bare ID.
    url: String,
    #[serde(default = "default_true")]
    transcripts: bool,
    #[serde(default = "default_true")]
    summaries: bool,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    model: Option<String>,
    /// Override the configured snippet extraction toggle.
    #[serde(default)]
    snippet: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
struct ProcessResponse {
    accepted: bool,
}

#[derive(Serialize)]
struct VideoView {
    title: String,
    description: String,
    transcript: String,
    summary: String,
}

impl From<ProcessedVideo> for VideoView {
    fn from(video: ProcessedVideo) -> Self {
        Self {
            title: video.record.title,
            description: video.record.description,
            transcript: video.transcript.unwrap_or_default(),
            summary: video.summary.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct StatusResponse {
    state: RunState,
    processed: usize,
    total: usize,
    progress: String,
    current: Option<VideoView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct NavigateRequest {
    /// "prev" or "next".
    direction: String,
}

#[derive(Serialize)]
struct LanguageInfo {
    name: &'static str,
    code: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Observer feeding the process manager as items complete.
struct ManagerObserver {
    manager: Arc<ProcessManager>,
}

impl ProgressObserver for ManagerObserver {
    fn on_total(&self, total: usize) {
        self.manager.set_total(total);
    }

    fn on_video(&self, video: &ProcessedVideo) {
        self.manager.add_video(video.clone());
    }
}

fn interactive_run_options(state: &AppState, req: &ProcessRequest) -> RunOptions {
    let settings = &state.settings;
    let snippet_enabled = req.snippet.unwrap_or(settings.snippet.enabled);

    let output_path: PathBuf = settings.output_dir().join(format!(
        "video_results_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));

    RunOptions {
        fetch_transcripts: req.transcripts || req.summaries,
        transcript_dir: settings.transcript_dir(),
        language: req
            .language
            .clone()
            .unwrap_or_else(|| settings.youtube.language.clone()),
        generate_summaries: req.summaries,
        summary_dir: settings.summary_dir(),
        snippet_markers: snippet_enabled.then(|| {
            SnippetMarkers::new(
                settings.snippet.start_marker.clone(),
                settings.snippet.end_marker.clone(),
            )
        }),
        output_path,
        csv: CsvOptions {
            include_transcripts: settings.transcripts.include_in_csv,
            include_summaries: settings.summaries.include_in_csv,
            sort_ascending: settings.export.sort_ascending,
        },
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn languages() -> impl IntoResponse {
    let list: Vec<LanguageInfo> = AVAILABLE_LANGUAGES
        .iter()
        .map(|&(name, code)| LanguageInfo { name, code })
        .collect();
    Json(list)
}

async fn models() -> impl IntoResponse {
    Json(AVAILABLE_MODELS)
}

async fn process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> impl IntoResponse {
    // Malformed input is rejected up front; nothing is processed.
    if let Err(e) = resolve_input(&req.url) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    if state.running.swap(true, Ordering::SeqCst) {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "A run is already in progress".to_string(),
            }),
        )
            .into_response();
    }

    let options = interactive_run_options(&state, &req);

    let summarizer: Option<Arc<dyn SummaryProvider>> = req.summaries.then(|| {
        let model = req
            .model
            .clone()
            .unwrap_or_else(|| state.settings.summaries.model.clone());
        let language = req
            .language
            .clone()
            .or_else(|| state.settings.summaries.language.clone());
        Arc::new(Summarizer::new(
            &model,
            language.as_deref(),
            state.openai_key.as_deref(),
        )) as Arc<dyn SummaryProvider>
    });

    let pipeline = Pipeline::new(
        Arc::new(PlaylistClient::new(&state.api_key)),
        Arc::new(CaptionClient::new()),
        summarizer,
    );

    state.manager.start();
    let control = state.manager.control();
    let manager = state.manager.clone();
    let worker_state = state.clone();
    let url = req.url.clone();

    tokio::spawn(async move {
        let observer = ManagerObserver {
            manager: manager.clone(),
        };
        match pipeline.run(&url, &options, &control, &observer).await {
            Ok(_) => manager.complete(),
            Err(e) => {
                error!("Run failed: {}", e);
                manager.fail(&e.to_string());
            }
        }
        worker_state.running.store(false, Ordering::SeqCst);
    });

    Json(ProcessResponse { accepted: true }).into_response()
}

fn status_response(manager: &ProcessManager) -> StatusResponse {
    let snapshot = manager.status();
    let progress = match snapshot.state {
        RunState::Idle => "Ready to start".to_string(),
        RunState::Running => format!(
            "Processing {}/{}",
            snapshot.processed_count, snapshot.total
        ),
        RunState::Paused => format!("Paused {}/{}", snapshot.processed_count, snapshot.total),
        RunState::Stopped => format!("Stopped {}/{}", snapshot.processed_count, snapshot.total),
        RunState::Completed => format!(
            "Completed {}/{}",
            snapshot.processed_count, snapshot.total
        ),
    };

    StatusResponse {
        state: snapshot.state,
        processed: snapshot.processed_count,
        total: snapshot.total,
        progress,
        current: manager.current().map(VideoView::from),
        error: snapshot.error,
    }
}

async fn pause(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.manager.pause();
    Json(status_response(&state.manager))
}

async fn resume(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.manager.resume();
    Json(status_response(&state.manager))
}

async fn stop(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.manager.stop();
    Json(status_response(&state.manager))
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(status_response(&state.manager))
}

async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigateRequest>,
) -> impl IntoResponse {
    let direction = match req.direction.as_str() {
        "prev" => Direction::Prev,
        "next" => Direction::Next,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Unknown direction: {}", other),
                }),
            )
                .into_response()
        }
    };

    Json(state.manager.navigate(direction).map(VideoView::from)).into_response()
}

async fn video_at(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    match state.manager.move_to(index) {
        Some(video) => Json(VideoView::from(video)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No processed video at index {}", index),
            }),
        )
            .into_response(),
    }
}
