//! Driver fatigue detection
//!
//! Turns raw video frames into edge-triggered fatigue events:
//! - Facial landmark extraction (consumed as an interface)
//! - Eye/mouth aspect ratio metrics with sentinel fallbacks
//! - Per-subject hysteresis state machines for drowsiness and yawning

pub mod analysis;
pub mod config;
pub mod landmarks;
pub mod metrics;
pub mod state;

pub use analysis::{FatigueEvent, FrameAnalysis};
pub use config::DetectionConfig;
pub use landmarks::{FaceRegion, FaceSelection, LandmarkExtractor, LandmarkSet, NullExtractor};
pub use metrics::Metrics;
pub use state::{AlertFlags, EyePhase, MouthPhase, SubjectState};

use camera_capture::frame::VideoFrame;

/// Per-frame detection pipeline
///
/// Stateless itself; per-subject mutable state is passed in by the session
/// that owns it, so concurrent subjects never share counters or latches.
pub struct Detector {
    extractor: Box<dyn LandmarkExtractor>,
    config: DetectionConfig,
}

impl Detector {
    pub fn new(extractor: Box<dyn LandmarkExtractor>, config: DetectionConfig) -> Self {
        Self { extractor, config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Analyze one frame and advance the subject's state machines.
    ///
    /// No face in frame resets both machines immediately; a missing or
    /// degenerate landmark set falls back to neutral sentinel metrics so the
    /// pipeline stays alive under noisy input.
    pub fn process(&self, frame: &VideoFrame, subject: &mut SubjectState) -> FrameAnalysis {
        let gray = frame.to_grayscale();
        let regions = self.extractor.detect(&gray, frame.width, frame.height);

        let Some(region) = self.config.face_selection.select(&regions) else {
            subject.reset();
            return FrameAnalysis::no_face();
        };

        let metrics = match self.extractor.predict(&gray, frame.width, frame.height, region) {
            Some(landmarks) => Metrics::from_landmarks(&landmarks),
            None => Metrics::neutral(),
        };

        let events = subject.update(&metrics, &self.config);

        FrameAnalysis {
            face_detected: true,
            region: Some(region.clone()),
            metrics: Some(metrics),
            flags: subject.flags(),
            events,
        }
    }
}
