//! Alerting
//!
//! Two gates sit between detection edges and the outside world:
//! - `AlarmCoordinator`: capacity-1, debounced audio alarm dispatch on a
//!   dedicated playback thread.
//! - `EventLogger`: cooldown-gated bridge to the persistence collaborator.

mod alarm;
mod gate;

pub use alarm::{AlarmCoordinator, AlarmSink, NullSink};
pub use gate::EventLogger;
