//! Frame analysis results

use serde::{Deserialize, Serialize};

use crate::landmarks::FaceRegion;
use crate::metrics::Metrics;
use crate::state::AlertFlags;

/// Edge-triggered fatigue event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FatigueEvent {
    /// Eyes below the EAR threshold for the consecutive-frame count
    Drowsiness,
    /// Mouth opened past the MAR threshold
    Yawning,
}

impl FatigueEvent {
    /// Label used in the persisted event record
    pub fn as_str(&self) -> &'static str {
        match self {
            FatigueEvent::Drowsiness => "Drowsiness Detected",
            FatigueEvent::Yawning => "Yawning Detected",
        }
    }
}

impl std::fmt::Display for FatigueEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Whether a face was found in this frame
    pub face_detected: bool,

    /// Monitored face region (if detected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<FaceRegion>,

    /// Metrics computed for this frame (if a face was detected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,

    /// Latch state after this frame
    pub flags: AlertFlags,

    /// Rising edges produced by this frame
    pub events: Vec<FatigueEvent>,
}

impl FrameAnalysis {
    /// Analysis for a frame with no visible face (machines were reset)
    pub fn no_face() -> Self {
        Self::default()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}
