//! Storage Layer
//!
//! Persistence collaborator for monitored subjects and their fatigue events,
//! behind a repository interface. The detection pipeline treats this layer as
//! an independently failable side effect: a storage error is reported, never
//! propagated into detection or alarm behavior.

mod repository;

pub use repository::{EventRecord, Repository, SubjectRecord};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found")]
    NotFound,

    #[error("Subject already registered: {0}")]
    Conflict(String),
}
