//! Per-subject fatigue state machines
//!
//! Two independent sub-machines advance on every processed frame:
//!
//! - Eye: `Awake -> Counting -> AlarmActive`, driven by consecutive low-EAR
//!   frames. The drowsiness event fires exactly once, on the transition into
//!   `AlarmActive`; staying below threshold does not re-fire.
//! - Mouth: `Closed <-> Yawning`, no counter. The yawning event fires on the
//!   rising edge only.
//!
//! A frame with no visible face resets both machines immediately.

use serde::{Deserialize, Serialize};

use crate::analysis::FatigueEvent;
use crate::config::DetectionConfig;
use crate::metrics::Metrics;

/// Eye sub-machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EyePhase {
    #[default]
    Awake,
    Counting,
    AlarmActive,
}

/// Mouth sub-machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouthPhase {
    #[default]
    Closed,
    Yawning,
}

/// Snapshot of the current latch state, served to pollers
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AlertFlags {
    pub drowsy: bool,
    pub yawning: bool,
}

/// Mutable detection state for one monitored subject
///
/// Created at session start and owned by the session; lives for the duration
/// of the monitored stream.
#[derive(Debug, Default)]
pub struct SubjectState {
    eye_phase: EyePhase,
    closed_frames: u32,
    mouth_phase: MouthPhase,
}

impl SubjectState {
    /// Advance both machines for one frame's metrics.
    ///
    /// Returns the rising edges produced by this frame, in fixed order
    /// (drowsiness first). Both can fire on the same frame.
    pub fn update(&mut self, metrics: &Metrics, config: &DetectionConfig) -> Vec<FatigueEvent> {
        let mut events = Vec::new();

        if metrics.ear < config.ear_threshold {
            self.closed_frames += 1;
            if self.closed_frames >= config.consec_frames {
                if self.eye_phase != EyePhase::AlarmActive {
                    self.eye_phase = EyePhase::AlarmActive;
                    events.push(FatigueEvent::Drowsiness);
                }
            } else {
                self.eye_phase = EyePhase::Counting;
            }
        } else {
            self.closed_frames = 0;
            self.eye_phase = EyePhase::Awake;
        }

        if metrics.mar > config.mar_threshold {
            if self.mouth_phase == MouthPhase::Closed {
                self.mouth_phase = MouthPhase::Yawning;
                events.push(FatigueEvent::Yawning);
            }
        } else {
            self.mouth_phase = MouthPhase::Closed;
        }

        events
    }

    /// Reset both machines (no face visible, or session restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn flags(&self) -> AlertFlags {
        AlertFlags {
            drowsy: self.eye_phase == EyePhase::AlarmActive,
            yawning: self.mouth_phase == MouthPhase::Yawning,
        }
    }

    pub fn eye_phase(&self) -> EyePhase {
        self.eye_phase
    }

    pub fn mouth_phase(&self) -> MouthPhase {
        self.mouth_phase
    }

    pub fn closed_frames(&self) -> u32 {
        self.closed_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn metrics(ear: f32, mar: f32) -> Metrics {
        Metrics { ear, mar }
    }

    fn run(state: &mut SubjectState, samples: &[(f32, f32)]) -> Vec<FatigueEvent> {
        let config = DetectionConfig::default();
        samples
            .iter()
            .flat_map(|&(ear, mar)| state.update(&metrics(ear, mar), &config))
            .collect()
    }

    #[test]
    fn open_eyes_keep_counter_at_zero() {
        let mut state = SubjectState::default();
        let events = run(&mut state, &[(0.25, 0.3); 25]);
        assert!(events.is_empty());
        assert_eq!(state.closed_frames(), 0);
        assert!(!state.flags().drowsy);
    }

    #[test]
    fn twenty_low_frames_fire_exactly_once() {
        let mut state = SubjectState::default();
        let events = run(&mut state, &[(0.15, 0.3); 20]);
        assert_eq!(events, vec![FatigueEvent::Drowsiness]);

        // Frames 21+ while still below threshold: no re-fire
        let more = run(&mut state, &[(0.15, 0.3); 30]);
        assert!(more.is_empty());
        assert!(state.flags().drowsy);
    }

    #[test]
    fn nineteen_low_frames_do_not_fire() {
        let mut state = SubjectState::default();
        let events = run(&mut state, &[(0.15, 0.3); 19]);
        assert!(events.is_empty());
        assert_eq!(state.eye_phase(), EyePhase::Counting);
    }

    #[test]
    fn recovery_clears_latch_and_rearms() {
        let mut state = SubjectState::default();
        run(&mut state, &[(0.15, 0.3); 20]);
        assert!(state.flags().drowsy);

        // One open-eyed frame clears everything
        run(&mut state, &[(0.3, 0.3)]);
        assert!(!state.flags().drowsy);
        assert_eq!(state.closed_frames(), 0);

        // A fresh run of 20 fires again
        let events = run(&mut state, &[(0.15, 0.3); 20]);
        assert_eq!(events, vec![FatigueEvent::Drowsiness]);
    }

    #[test]
    fn yawn_fires_on_rising_edge_only() {
        let mut state = SubjectState::default();
        let events = run(&mut state, &[(0.3, 0.3), (0.3, 0.7), (0.3, 0.7), (0.3, 0.3)]);
        assert_eq!(events, vec![FatigueEvent::Yawning]);
        assert!(!state.flags().yawning);

        // Second crossing is a new edge
        let again = run(&mut state, &[(0.3, 0.7)]);
        assert_eq!(again, vec![FatigueEvent::Yawning]);
    }

    #[test]
    fn held_yawn_fires_once_not_per_frame() {
        let mut state = SubjectState::default();
        let mut samples = vec![(0.3, 0.7)];
        samples.extend(std::iter::repeat((0.3, 0.7)).take(10));
        let events = run(&mut state, &samples);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn reset_mid_count_discards_progress() {
        let mut state = SubjectState::default();
        run(&mut state, &[(0.15, 0.7); 15]);
        state.reset();

        assert_eq!(state.closed_frames(), 0);
        assert_eq!(state.eye_phase(), EyePhase::Awake);
        assert_eq!(state.mouth_phase(), MouthPhase::Closed);

        // Needs a full run again after the reset
        let events = run(&mut state, &[(0.15, 0.3); 19]);
        assert!(events.is_empty());
    }

    #[test]
    fn consec_frames_of_one_fires_immediately() {
        let config = DetectionConfig {
            consec_frames: 1,
            ..Default::default()
        };
        let mut state = SubjectState::default();
        let events = state.update(&metrics(0.1, 0.3), &config);
        assert_eq!(events, vec![FatigueEvent::Drowsiness]);
    }

    proptest! {
        /// Frames at or above the EAR threshold can never produce a
        /// drowsiness event or leave the counter non-zero.
        #[test]
        fn no_drowsiness_without_low_ear(ears in prop::collection::vec(0.2f32..1.0, 1..200)) {
            let config = DetectionConfig::default();
            let mut state = SubjectState::default();
            for ear in ears {
                let events = state.update(&metrics(ear, 0.3), &config);
                prop_assert!(!events.contains(&FatigueEvent::Drowsiness));
                prop_assert_eq!(state.closed_frames(), 0);
                prop_assert!(!state.flags().drowsy);
            }
        }

        /// Over any metric sequence, drowsiness events equal the number of
        /// distinct threshold crossings that reached the frame count.
        #[test]
        fn edges_match_crossings(samples in prop::collection::vec((0.0f32..0.4, 0.0f32..1.0), 1..300)) {
            let config = DetectionConfig { consec_frames: 3, ..Default::default() };
            let mut state = SubjectState::default();

            let mut expected = 0u32;
            let mut low_run = 0u32;
            let mut latched = false;
            for &(ear, _) in &samples {
                if ear < config.ear_threshold {
                    low_run += 1;
                    if low_run >= config.consec_frames && !latched {
                        latched = true;
                        expected += 1;
                    }
                } else {
                    low_run = 0;
                    latched = false;
                }
            }

            let fired: u32 = samples
                .iter()
                .map(|&(ear, mar)| {
                    state
                        .update(&metrics(ear, mar), &config)
                        .contains(&FatigueEvent::Drowsiness) as u32
                })
                .sum();
            prop_assert_eq!(fired, expected);
        }
    }
}
