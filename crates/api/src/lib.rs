//! Driver Fatigue Monitor API Server
//!
//! HTTP surface over the detection pipeline: annotated MJPEG stream per
//! subject, alert-state polling, recent event log, and health. Authentication
//! and rendering are external collaborators; every endpoint assumes the
//! caller is already authorized.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use alerting::{AlarmCoordinator, EventLogger, NullSink};
use camera_capture::{CameraConfig, FrameSource, SyntheticDevice};
use detection::{AlertFlags, Detector, NullExtractor, SubjectState};
use storage::Repository;

pub mod app_config;
pub mod render;
pub mod stream;

mod routes;

pub use app_config::AppConfig;

/// Application state shared across handlers
pub struct AppState {
    pub repository: Arc<Repository>,
    pub source: Arc<FrameSource>,
    pub detector: Arc<Detector>,
    pub alarm: Arc<AlarmCoordinator>,
    pub logger: Arc<EventLogger>,
    /// Detection state keyed per subject; each entry is owned by the
    /// sessions streaming that subject and locked per frame.
    subjects: Mutex<HashMap<i64, Arc<Mutex<SubjectState>>>>,
    pub version: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let repository = Arc::new(Repository::new());
        let camera_config: CameraConfig = config.camera.clone().into();
        let device = SyntheticDevice::new(&camera_config);
        let source = Arc::new(FrameSource::new(Box::new(device), &camera_config));
        let detector = Arc::new(Detector::new(
            Box::new(NullExtractor::new()),
            config.detection.clone(),
        ));
        let alarm = Arc::new(AlarmCoordinator::new(
            Arc::new(NullSink),
            Duration::from_secs(config.alarm_duration_secs),
        ));
        let logger = Arc::new(EventLogger::new(
            Arc::clone(&repository),
            Duration::from_secs(config.log_cooldown_secs),
        ));

        Self {
            repository,
            source,
            detector,
            alarm,
            logger,
            subjects: Mutex::new(HashMap::new()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Detection state for one subject, created on first use.
    ///
    /// Concurrent streams for the same subject share one state object, so
    /// counters and latches stay consistent across viewers.
    pub fn subject_state(&self, subject_id: i64) -> Arc<Mutex<SubjectState>> {
        let mut subjects = self
            .subjects
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            subjects
                .entry(subject_id)
                .or_insert_with(|| Arc::new(Mutex::new(SubjectState::default()))),
        )
    }

    /// Current latch snapshot for a subject; default (all clear) if the
    /// subject has never streamed.
    pub fn subject_flags(&self, subject_id: i64) -> AlertFlags {
        let subjects = self
            .subjects
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        subjects
            .get(&subject_id)
            .map(|state| {
                state
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .flags()
            })
            .unwrap_or_default()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub metrics: SystemMetrics,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub subject_count: usize,
    pub event_count: usize,
    pub alarm_active: bool,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route(
            "/api/v1/subjects",
            post(routes::subjects::create).get(routes::subjects::list),
        )
        .route("/api/v1/subjects/:id/alerts", get(routes::alerts::poll_alert_state))
        .route("/api/v1/subjects/:id/events", get(routes::events::recent))
        .route("/api/v1/subjects/:id/stream", get(stream::stream_frames))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        metrics: SystemMetrics {
            subject_count: state.repository.subject_count(),
            event_count: state.repository.event_count(),
            alarm_active: state.alarm.is_active(),
        },
    };

    (StatusCode::OK, Json(response))
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(&config));
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
