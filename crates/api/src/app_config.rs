//! Application configuration
//!
//! Defaults match the reference deployment; any field can be overridden via
//! an optional `monitor.toml` next to the binary or `MONITOR_`-prefixed
//! environment variables (e.g. `MONITOR_DETECTION__EAR_THRESHOLD=0.25`).

use camera_capture::CameraConfig;
use detection::DetectionConfig;
use serde::{Deserialize, Serialize};

/// Camera settings (serializable mirror of `CameraConfig`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub reopen_backoff_ms: u64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let config = CameraConfig::cabin();
        Self {
            device: config.device,
            width: config.width,
            height: config.height,
            fps: config.fps,
            reopen_backoff_ms: config.reopen_backoff_ms,
        }
    }
}

impl From<CameraSettings> for CameraConfig {
    fn from(settings: CameraSettings) -> Self {
        Self {
            device: settings.device,
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
            reopen_backoff_ms: settings.reopen_backoff_ms,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listen address for the HTTP server
    pub bind_addr: String,
    pub camera: CameraSettings,
    pub detection: DetectionConfig,
    /// Alarm playback duration (seconds)
    pub alarm_duration_secs: u64,
    /// Minimum gap between logged events of one type (seconds)
    pub log_cooldown_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            camera: CameraSettings::default(),
            detection: DetectionConfig::default(),
            alarm_duration_secs: 3,
            log_cooldown_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load config: defaults, then optional file, then environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("monitor").required(false))
            .add_source(
                config::Environment::with_prefix("MONITOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
