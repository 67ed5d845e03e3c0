//! Camera Capture Library
//!
//! Provides exclusive access to a cabin-facing camera for driver fatigue
//! monitoring. A single lock serializes every reader of the device, and read
//! failures are recovered in place by reopening the device after a short
//! backoff, so consumers only ever see "retry next frame".

pub mod device;
pub mod frame;
pub mod source;

pub use device::{CaptureDevice, SyntheticDevice};
pub use frame::VideoFrame;
pub use source::FrameSource;

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Device read failed: {0}")]
    Read(String),

    /// The device was reinitialized after a failed read; the caller should
    /// simply try again on its next iteration.
    #[error("Device recovering, retry next read")]
    Retry,

    #[error("Camera not initialized")]
    NotInitialized,
}

/// Camera configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Pause before reopening a failed device (milliseconds)
    pub reopen_backoff_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 15,
            reopen_backoff_ms: 500,
        }
    }
}

impl CameraConfig {
    /// Cabin monitoring camera (driver-facing)
    pub fn cabin() -> Self {
        Self::default()
    }
}
