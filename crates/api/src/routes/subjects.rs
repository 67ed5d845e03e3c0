//! Subject registration and listing
//!
//! Minimal subject management so events have something to attach to; user
//! accounts and authentication live in an external service.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use storage::{StorageError, SubjectRecord};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSubject {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SubjectResponse {
    pub id: i64,
    pub name: String,
}

/// `POST /api/v1/subjects`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSubject>,
) -> Result<(StatusCode, Json<SubjectResponse>), StatusCode> {
    if body.name.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    match state.repository.register_subject(body.name.trim()) {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(SubjectResponse {
                id,
                name: body.name.trim().to_string(),
            }),
        )),
        Err(StorageError::Conflict(_)) => Err(StatusCode::CONFLICT),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// `GET /api/v1/subjects`
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SubjectRecord>>, StatusCode> {
    state
        .repository
        .subjects()
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
