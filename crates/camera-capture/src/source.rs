//! Exclusive frame source
//!
//! One `Mutex` serializes all readers of the underlying device, so
//! concurrent viewers of the same feed never interleave reads. A failed read
//! triggers release-pause-reopen and reports `CameraError::Retry`; the
//! consumer loops and tries again on its next iteration. There is no upper
//! retry bound.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use crate::device::CaptureDevice;
use crate::frame::VideoFrame;
use crate::{CameraConfig, CameraError};

/// Exclusive, self-healing access to a capture device
pub struct FrameSource {
    device: Mutex<Box<dyn CaptureDevice>>,
    reopen_backoff: Duration,
}

impl FrameSource {
    pub fn new(device: Box<dyn CaptureDevice>, config: &CameraConfig) -> Self {
        Self {
            device: Mutex::new(device),
            reopen_backoff: Duration::from_millis(config.reopen_backoff_ms),
        }
    }

    /// Read one frame under the device lock.
    ///
    /// On a read failure the device is reinitialized while the lock is still
    /// held (recovery must not interleave with other readers) and the caller
    /// gets `CameraError::Retry`.
    pub fn acquire(&self) -> Result<VideoFrame, CameraError> {
        let mut device = self
            .device
            .lock()
            .map_err(|_| CameraError::NotInitialized)?;

        match device.read() {
            Ok(frame) => Ok(frame),
            Err(err) => {
                warn!(error = %err, "camera read failed, reinitializing device");
                std::thread::sleep(self.reopen_backoff);
                if let Err(reopen_err) = device.reopen() {
                    warn!(error = %reopen_err, "device reopen failed, will retry");
                } else {
                    debug!("device reopened");
                }
                Err(CameraError::Retry)
            }
        }
    }
}
