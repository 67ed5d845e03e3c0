//! Cooldown-gated event logging
//!
//! A (subject, event type) pair logs at most once per cooldown window, no
//! matter how often the detection edge fires. The gate only throttles
//! persistence; it never suppresses alarm dispatch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use detection::FatigueEvent;
use storage::Repository;
use tracing::{debug, info, warn};

/// Bridge from detection edges to the persistence collaborator
pub struct EventLogger {
    repository: Arc<Repository>,
    cooldown: Duration,
    last_attempt: Mutex<HashMap<(i64, FatigueEvent), Instant>>,
}

impl EventLogger {
    pub fn new(repository: Arc<Repository>, cooldown: Duration) -> Self {
        Self {
            repository,
            cooldown,
            last_attempt: Mutex::new(HashMap::new()),
        }
    }

    /// Attempt to log one event for a subject.
    ///
    /// Returns `false` when the cooldown window is still open, the subject is
    /// unknown, or the insert fails. The attempt timestamp is recorded as
    /// soon as the gate opens, regardless of the insert outcome, so a failing
    /// store does not turn into a per-frame retry storm.
    pub fn log(&self, subject_id: i64, event: FatigueEvent) -> bool {
        let key = (subject_id, event);
        {
            let mut attempts = match self.last_attempt.lock() {
                Ok(guard) => guard,
                Err(_) => return false,
            };
            if let Some(last) = attempts.get(&key) {
                if last.elapsed() < self.cooldown {
                    debug!(subject_id, %event, "event suppressed by cooldown");
                    return false;
                }
            }
            attempts.insert(key, Instant::now());
        }

        if !self.repository.subject_exists(subject_id) {
            warn!(subject_id, %event, "unknown subject, event not logged");
            return false;
        }

        match self.repository.insert_event(subject_id, event.as_str(), Utc::now()) {
            Ok(event_id) => {
                info!(subject_id, %event, event_id, "logged fatigue event");
                true
            }
            Err(e) => {
                warn!(subject_id, %event, error = %e, "failed to persist event");
                false
            }
        }
    }
}
