//! Capacity-bounded alarm dispatch
//!
//! At most one playback runs at any time. `trigger()` never blocks: it takes
//! the single semaphore permit if free and hands it to a dedicated playback
//! thread; if the permit is held, the trigger is dropped, not queued. The
//! permit is owned by the playback thread's closure, so it is released when
//! the thread exits on any path, including a panicking sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// External audio playback capability
pub trait AlarmSink: Send + Sync {
    /// Play the alarm cue, blocking for a bounded duration
    fn play(&self, duration: Duration);
}

/// Sink used when no audio backend is wired; holds the slot for the full
/// playback duration so debounce timing still matches a real alarm.
pub struct NullSink;

impl AlarmSink for NullSink {
    fn play(&self, duration: Duration) {
        info!(?duration, "ALARM (no audio backend wired)");
        std::thread::sleep(duration);
    }
}

/// Debounced, capacity-1 alarm dispatcher
pub struct AlarmCoordinator {
    sink: Arc<dyn AlarmSink>,
    slot: Arc<Semaphore>,
    duration: Duration,
}

impl AlarmCoordinator {
    pub fn new(sink: Arc<dyn AlarmSink>, duration: Duration) -> Self {
        Self {
            sink,
            slot: Arc::new(Semaphore::new(1)),
            duration,
        }
    }

    /// Start playback if no alarm is in progress; silent no-op otherwise.
    pub fn trigger(&self) {
        let permit = match Arc::clone(&self.slot).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!("alarm already in progress, trigger dropped");
                return;
            }
        };

        let sink = Arc::clone(&self.sink);
        let duration = self.duration;
        let handle = std::thread::Builder::new()
            .name("alarm-playback".into())
            .spawn(move || {
                // Permit is owned by this closure: dropped when the thread
                // exits, normal return or unwind alike.
                let _permit = permit;
                debug!("alarm playback started");
                sink.play(duration);
                debug!("alarm playback finished");
            });

        if let Err(e) = handle {
            error!(error = %e, "failed to spawn alarm playback thread");
        }
    }

    /// Whether a playback currently holds the slot
    pub fn is_active(&self) -> bool {
        self.slot.available_permits() == 0
    }
}
