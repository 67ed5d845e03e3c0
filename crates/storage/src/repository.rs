//! Repository implementation

use crate::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info};

/// A monitored subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: i64,
    pub name: String,
}

/// A persisted fatigue event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub subject_id: i64,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
}

/// Repository for subjects and events (in-memory implementation)
pub struct Repository {
    subjects: Mutex<Vec<SubjectRecord>>,
    events: Mutex<VecDeque<EventRecord>>,
    max_event_records: usize,
    next_subject_id: Mutex<i64>,
    next_event_id: Mutex<i64>,
}

impl Repository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            subjects: Mutex::new(Vec::new()),
            events: Mutex::new(VecDeque::with_capacity(1000)),
            max_event_records: 10_000,
            next_subject_id: Mutex::new(1),
            next_event_id: Mutex::new(1),
        }
    }

    /// Register a new subject; names are unique.
    pub fn register_subject(&self, name: &str) -> Result<i64, StorageError> {
        let mut subjects = self.lock(&self.subjects)?;
        if subjects.iter().any(|s| s.name == name) {
            return Err(StorageError::Conflict(name.to_string()));
        }

        let mut next_id = self.lock(&self.next_subject_id)?;
        let id = *next_id;
        *next_id += 1;

        subjects.push(SubjectRecord {
            id,
            name: name.to_string(),
        });
        info!(subject_id = id, name, "registered subject");
        Ok(id)
    }

    /// Check whether a subject id is known
    pub fn subject_exists(&self, id: i64) -> bool {
        self.subjects
            .lock()
            .map(|s| s.iter().any(|r| r.id == id))
            .unwrap_or(false)
    }

    /// List all subjects
    pub fn subjects(&self) -> Result<Vec<SubjectRecord>, StorageError> {
        Ok(self.lock(&self.subjects)?.clone())
    }

    /// Insert a timestamped fatigue event
    pub fn insert_event(
        &self,
        subject_id: i64,
        event_type: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let mut events = self.lock(&self.events)?;

        let mut next_id = self.lock(&self.next_event_id)?;
        let id = *next_id;
        *next_id += 1;

        // Enforce retention
        while events.len() >= self.max_event_records {
            events.pop_front();
        }

        events.push_back(EventRecord {
            id,
            subject_id,
            event_type: event_type.to_string(),
            timestamp,
        });
        debug!(event_id = id, subject_id, event_type, "inserted event");
        Ok(id)
    }

    /// Recent events for one subject, newest first
    pub fn recent_events(
        &self,
        subject_id: i64,
        limit: usize,
    ) -> Result<Vec<EventRecord>, StorageError> {
        let events = self.lock(&self.events)?;
        Ok(events
            .iter()
            .rev()
            .filter(|e| e.subject_id == subject_id)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Total event count
    pub fn event_count(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Total subject count
    pub fn subject_count(&self) -> usize {
        self.subjects.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        if let Ok(mut subjects) = self.subjects.lock() {
            subjects.clear();
        }
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn lock<'a, T>(
        &self,
        mutex: &'a Mutex<T>,
    ) -> Result<std::sync::MutexGuard<'a, T>, StorageError> {
        mutex
            .lock()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
