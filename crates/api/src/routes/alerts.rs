//! Alert state polling

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Current latch state for one subject
#[derive(Debug, Serialize)]
pub struct AlertStateResponse {
    pub subject_id: i64,
    pub drowsy: bool,
    pub yawning: bool,
}

/// `GET /api/v1/subjects/:id/alerts`
///
/// Synchronous snapshot of the subject's latches. Authorization is the
/// caller's concern.
pub async fn poll_alert_state(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<i64>,
) -> Result<Json<AlertStateResponse>, StatusCode> {
    if !state.repository.subject_exists(subject_id) {
        return Err(StatusCode::NOT_FOUND);
    }

    let flags = state.subject_flags(subject_id);
    Ok(Json(AlertStateResponse {
        subject_id,
        drowsy: flags.drowsy,
        yawning: flags.yawning,
    }))
}
