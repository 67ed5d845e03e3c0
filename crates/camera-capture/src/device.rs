//! Capture device abstraction
//!
//! The real camera backend is an external collaborator (V4L2, platform SDK).
//! `SyntheticDevice` stands in when no hardware backend is wired so the
//! pipeline can run end-to-end.

use crate::frame::VideoFrame;
use crate::{CameraConfig, CameraError};
use tracing::warn;

/// Blocking video capture device
pub trait CaptureDevice: Send {
    /// Read one frame, blocking until the device delivers it
    fn read(&mut self) -> Result<VideoFrame, CameraError>;

    /// Release and reinitialize the device handle after a failed read
    fn reopen(&mut self) -> Result<(), CameraError>;
}

/// Test-pattern device producing a moving gradient
pub struct SyntheticDevice {
    width: u32,
    height: u32,
    sequence: u64,
    /// Read results injected by tests: `false` forces a read failure
    fail_script: Vec<bool>,
}

impl SyntheticDevice {
    pub fn new(config: &CameraConfig) -> Self {
        warn!(
            device = %config.device,
            "no camera backend wired, using synthetic test pattern"
        );
        Self {
            width: config.width,
            height: config.height,
            sequence: 0,
            fail_script: Vec::new(),
        }
    }

    /// Script upcoming reads; each `false` entry fails one read.
    pub fn with_fail_script(mut self, script: Vec<bool>) -> Self {
        self.fail_script = script;
        self
    }
}

impl CaptureDevice for SyntheticDevice {
    fn read(&mut self) -> Result<VideoFrame, CameraError> {
        if !self.fail_script.is_empty() && !self.fail_script.remove(0) {
            return Err(CameraError::Read("scripted failure".into()));
        }

        let shift = (self.sequence % 256) as u8;
        let mut data = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                data.push((x as u8).wrapping_add(shift));
                data.push((y as u8).wrapping_add(shift));
                data.push(shift);
            }
        }

        let frame = VideoFrame::new(data, self.width, self.height, self.sequence);
        self.sequence += 1;
        Ok(frame)
    }

    fn reopen(&mut self) -> Result<(), CameraError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_frames_are_sequenced() {
        let mut dev = SyntheticDevice::new(&CameraConfig {
            width: 4,
            height: 4,
            ..Default::default()
        });
        assert_eq!(dev.read().unwrap().sequence, 0);
        assert_eq!(dev.read().unwrap().sequence, 1);
    }

    #[test]
    fn scripted_failure_surfaces_as_read_error() {
        let mut dev = SyntheticDevice::new(&CameraConfig::default())
            .with_fail_script(vec![false, true]);
        assert!(matches!(dev.read(), Err(CameraError::Read(_))));
        assert!(dev.read().is_ok());
    }
}
