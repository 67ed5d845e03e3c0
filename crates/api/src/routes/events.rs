//! Recent fatigue events

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use storage::EventRecord;

use crate::AppState;

/// Query parameters for the events endpoint
#[derive(Debug, Deserialize)]
pub struct EventQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

/// Response for the events endpoint; per-type counts cover the returned
/// window (what the reference dashboard charts).
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub data: Vec<EventRecord>,
    pub count: usize,
    pub drowsy_count: usize,
    pub yawning_count: usize,
}

/// `GET /api/v1/subjects/:id/events`
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<i64>,
    Query(params): Query<EventQuery>,
) -> Result<Json<EventResponse>, StatusCode> {
    if !state.repository.subject_exists(subject_id) {
        return Err(StatusCode::NOT_FOUND);
    }

    let events = state
        .repository
        .recent_events(subject_id, params.limit)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let drowsy_count = events
        .iter()
        .filter(|e| e.event_type == "Drowsiness Detected")
        .count();
    let yawning_count = events
        .iter()
        .filter(|e| e.event_type == "Yawning Detected")
        .count();

    Ok(Json(EventResponse {
        count: events.len(),
        drowsy_count,
        yawning_count,
        data: events,
    }))
}
