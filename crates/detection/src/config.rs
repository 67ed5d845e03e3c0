//! Detection configuration

use serde::{Deserialize, Serialize};

use crate::landmarks::FaceSelection;

/// Detection thresholds and policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// EAR below this value counts as a closed eye
    pub ear_threshold: f32,

    /// Consecutive low-EAR frames before the drowsiness alarm fires
    pub consec_frames: u32,

    /// MAR above this value counts as a yawn
    pub mar_threshold: f32,

    /// Which detected face to monitor when several are present
    pub face_selection: FaceSelection,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.2,
            consec_frames: 20,
            mar_threshold: 0.6,
            face_selection: FaceSelection::First,
        }
    }
}

impl DetectionConfig {
    /// Stricter thresholds (fires earlier)
    pub fn strict() -> Self {
        Self {
            ear_threshold: 0.25,
            consec_frames: 12,
            mar_threshold: 0.5,
            ..Default::default()
        }
    }

    /// More lenient thresholds (fewer false positives)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.18,
            consec_frames: 30,
            mar_threshold: 0.7,
            ..Default::default()
        }
    }
}
