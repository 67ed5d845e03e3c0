//! Eye and mouth aspect ratio calculators
//!
//! Both ratios are recomputed from scratch every frame from fixed subsets of
//! the 68-point landmark layout. Degenerate geometry never fails a frame:
//! the calculators fall back to neutral sentinels (eyes open, mouth closed).

use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkSet, Point};

/// EAR reported when eye geometry is degenerate ("eyes open")
pub const EAR_OPEN_SENTINEL: f32 = 0.5;

/// MAR reported when mouth geometry is degenerate ("mouth closed")
pub const MAR_CLOSED_SENTINEL: f32 = 0.3;

/// Per-frame geometric metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Eye aspect ratio, mean of both eyes; low means closed
    pub ear: f32,
    /// Mouth aspect ratio; high means wide open
    pub mar: f32,
}

impl Metrics {
    /// Neutral sentinel metrics (used when landmark prediction fails)
    pub fn neutral() -> Self {
        Self {
            ear: EAR_OPEN_SENTINEL,
            mar: MAR_CLOSED_SENTINEL,
        }
    }

    /// Derive metrics from a landmark set, sentinel per degenerate feature
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Self {
        let ear = match (
            eye_aspect_ratio(landmarks.left_eye()),
            eye_aspect_ratio(landmarks.right_eye()),
        ) {
            (Some(left), Some(right)) => (left + right) / 2.0,
            _ => EAR_OPEN_SENTINEL,
        };

        let mar = mouth_aspect_ratio(landmarks.mouth()).unwrap_or(MAR_CLOSED_SENTINEL);

        Self { ear, mar }
    }
}

fn dist(a: Point, b: Point) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// EAR over the canonical 6-point eye contour:
/// (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)
pub fn eye_aspect_ratio(eye: &[Point]) -> Option<f32> {
    if eye.len() != 6 {
        return None;
    }
    let a = dist(eye[1], eye[5]);
    let b = dist(eye[2], eye[4]);
    let c = dist(eye[0], eye[3]);
    if c <= f32::EPSILON {
        return None;
    }
    Some((a + b) / (2.0 * c))
}

/// MAR over the 20-point mouth contour: two vertical inner-mouth distances
/// over the horizontal corner distance:
/// (|m2-m10| + |m4-m8|) / (2 * |m0-m6|)
pub fn mouth_aspect_ratio(mouth: &[Point]) -> Option<f32> {
    if mouth.len() != 20 {
        return None;
    }
    let horizontal = dist(mouth[0], mouth[6]);
    if horizontal <= f32::EPSILON {
        return None;
    }
    let upper = dist(mouth[2], mouth[10]);
    let lower = dist(mouth[4], mouth[8]);
    Some((upper + lower) / (2.0 * horizontal))
}
