//! Facial landmark interface
//!
//! Landmark extraction is an external capability (dlib-style 68-point
//! predictor, ONNX model, platform SDK); this crate only consumes it.
//! `NullExtractor` stands in when no model is wired.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::warn;

/// Number of points in the canonical facial landmark layout
pub const LANDMARK_COUNT: usize = 68;

/// Index ranges into the 68-point layout (dlib point ordering)
pub const RIGHT_EYE: Range<usize> = 36..42;
pub const LEFT_EYE: Range<usize> = 42..48;
pub const MOUTH: Range<usize> = 48..68;

/// A 2D landmark point in frame coordinates
pub type Point = (f32, f32);

/// Detected face region in frame coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceRegion {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Ordered set of 68 facial keypoints for one face
///
/// Recomputed every frame, never cached across frames.
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Build from exactly 68 ordered points; anything else is rejected.
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.len() != LANDMARK_COUNT {
            return None;
        }
        Some(Self { points })
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.points[RIGHT_EYE]
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.points[LEFT_EYE]
    }

    pub fn mouth(&self) -> &[Point] {
        &self.points[MOUTH]
    }
}

/// External landmark extraction capability
///
/// An empty result from `detect` is a normal outcome, not an error.
pub trait LandmarkExtractor: Send + Sync {
    /// Find face regions in a grayscale frame
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceRegion>;

    /// Predict the 68-point landmark set for one region
    fn predict(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
        region: &FaceRegion,
    ) -> Option<LandmarkSet>;
}

/// Fallback extractor used when no landmark model is configured
///
/// Reports no faces, which keeps the state machines in their reset state.
pub struct NullExtractor;

impl NullExtractor {
    pub fn new() -> Self {
        warn!("no landmark model configured, face detection disabled");
        Self
    }
}

impl Default for NullExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkExtractor for NullExtractor {
    fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceRegion> {
        Vec::new()
    }

    fn predict(
        &self,
        _gray: &[u8],
        _width: u32,
        _height: u32,
        _region: &FaceRegion,
    ) -> Option<LandmarkSet> {
        None
    }
}

/// Which face to monitor when the extractor reports several
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceSelection {
    /// First region in extractor order (reference behavior)
    #[default]
    First,
    /// Region with the largest area
    Largest,
}

impl FaceSelection {
    pub fn select<'a>(&self, regions: &'a [FaceRegion]) -> Option<&'a FaceRegion> {
        match self {
            FaceSelection::First => regions.first(),
            FaceSelection::Largest => regions
                .iter()
                .max_by(|a, b| a.area().total_cmp(&b.area())),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    //! Scripted extractor and landmark builders for tests

    use super::*;

    /// Build a landmark set whose eyes and mouth produce the given ratios.
    ///
    /// Eye width is 4, so vertical half-gaps of `2 * ear` give
    /// (A + B) / (2 * C) = ear; mouth width is 6 with half-gap `3 * mar`.
    pub fn synthetic_landmarks(ear: f32, mar: f32) -> LandmarkSet {
        let mut points = vec![(0.0, 0.0); LANDMARK_COUNT];

        for eye_start in [RIGHT_EYE.start, LEFT_EYE.start] {
            let h = 2.0 * ear;
            points[eye_start] = (0.0, 0.0);
            points[eye_start + 1] = (1.0, h);
            points[eye_start + 2] = (3.0, h);
            points[eye_start + 3] = (4.0, 0.0);
            points[eye_start + 4] = (3.0, -h);
            points[eye_start + 5] = (1.0, -h);
        }

        let v = 3.0 * mar;
        points[MOUTH.start] = (0.0, 0.0);
        points[MOUTH.start + 2] = (2.0, v);
        points[MOUTH.start + 4] = (4.0, v);
        points[MOUTH.start + 6] = (6.0, 0.0);
        points[MOUTH.start + 8] = (4.0, -v);
        points[MOUTH.start + 10] = (2.0, -v);

        LandmarkSet::new(points).unwrap()
    }

    /// Extractor that replays one scripted response forever
    pub struct StubExtractor {
        region: Option<FaceRegion>,
        landmarks: Option<LandmarkSet>,
    }

    impl StubExtractor {
        pub fn no_face() -> Self {
            Self {
                region: None,
                landmarks: None,
            }
        }

        pub fn face_without_landmarks() -> Self {
            Self {
                region: Some(FaceRegion {
                    x: 0.0,
                    y: 0.0,
                    width: 10.0,
                    height: 10.0,
                }),
                landmarks: None,
            }
        }

        pub fn with_landmarks(landmarks: LandmarkSet) -> Self {
            Self {
                region: Some(FaceRegion {
                    x: 0.0,
                    y: 0.0,
                    width: 10.0,
                    height: 10.0,
                }),
                landmarks: Some(landmarks),
            }
        }
    }

    impl LandmarkExtractor for StubExtractor {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceRegion> {
            self.region.clone().into_iter().collect()
        }

        fn predict(
            &self,
            _gray: &[u8],
            _width: u32,
            _height: u32,
            _region: &FaceRegion,
        ) -> Option<LandmarkSet> {
            self.landmarks.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_set_rejects_wrong_cardinality() {
        assert!(LandmarkSet::new(vec![(0.0, 0.0); 67]).is_none());
        assert!(LandmarkSet::new(vec![(0.0, 0.0); 68]).is_some());
    }

    #[test]
    fn selection_strategies() {
        let small = FaceRegion {
            x: 0.0,
            y: 0.0,
            width: 2.0,
            height: 2.0,
        };
        let big = FaceRegion {
            x: 5.0,
            y: 5.0,
            width: 8.0,
            height: 8.0,
        };
        let regions = vec![small.clone(), big.clone()];

        assert_eq!(FaceSelection::First.select(&regions), Some(&small));
        assert_eq!(FaceSelection::Largest.select(&regions), Some(&big));
        assert_eq!(FaceSelection::First.select(&[]), None);
    }
}
