use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// File looked up in the working directory at startup. Missing means defaults.
pub const DEFAULT_CONFIG_FILE: &str = "motion-recorder.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_device_index")]
    pub device_index: u32,
    #[serde(default = "default_input_format")]
    pub input_format: String,
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// FourCC written into the AVI stream header.
    #[serde(default = "default_codec_tag")]
    pub codec_tag: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Delta level above which a pixel counts as foreground.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Side of the square dilation kernel.
    #[serde(default = "default_kernel_size")]
    pub kernel_size: u32,
    /// A contour is motion if its area is strictly greater than this.
    #[serde(default = "default_min_area")]
    pub min_area: f64,
    /// Frames after which the background learning rate stops decaying.
    #[serde(default = "default_history")]
    pub history: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_overlay_x")]
    pub x: u32,
    /// Baseline of the stamp text, measured from the top of the frame.
    #[serde(default = "default_overlay_y")]
    pub y: u32,
    #[serde(default = "default_overlay_scale")]
    pub scale: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: default_device_index(),
            input_format: default_input_format(),
            ffmpeg_bin: default_ffmpeg_bin(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            codec_tag: default_codec_tag(),
            file_prefix: default_file_prefix(),
            extension: default_extension(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            kernel_size: default_kernel_size(),
            min_area: default_min_area(),
            history: default_history(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            x: default_overlay_x(),
            y: default_overlay_y(),
            scale: default_overlay_scale(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl CameraConfig {
    /// Device node for the configured index, e.g. `/dev/video0`.
    pub fn device_path(&self) -> String {
        format!("/dev/video{}", self.device_index)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the compiled-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

// Default value functions
fn default_device_index() -> u32 {
    0
}
fn default_input_format() -> String {
    "v4l2".into()
}
fn default_ffmpeg_bin() -> String {
    "ffmpeg".into()
}
fn default_fps() -> u32 {
    25
}
fn default_codec_tag() -> String {
    "MJPG".into()
}
fn default_file_prefix() -> String {
    "motion_".into()
}
fn default_extension() -> String {
    "avi".into()
}
fn default_output_dir() -> String {
    ".".into()
}
fn default_threshold() -> u8 {
    25
}
fn default_kernel_size() -> u32 {
    3
}
fn default_min_area() -> f64 {
    4000.0
}
fn default_history() -> u32 {
    500
}
fn default_overlay_x() -> u32 {
    10
}
fn default_overlay_y() -> u32 {
    20
}
fn default_overlay_scale() -> u32 {
    2
}
fn default_log_level() -> String {
    "info".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_compiled_in_constants() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.recording.fps, 25);
        assert_eq!(config.recording.codec_tag, "MJPG");
        assert_eq!(config.detection.threshold, 25);
        assert_eq!(config.detection.kernel_size, 3);
        assert_eq!(config.detection.min_area, 4000.0);
        assert_eq!((config.overlay.x, config.overlay.y), (10, 20));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [camera]
            device_index = 2

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.camera.device_path(), "/dev/video2");
        assert_eq!(config.camera.input_format, "v4l2");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.recording.extension, "avi");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("motion-recorder-does-not-exist.toml");
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.recording.file_prefix, "motion_");
    }

    #[test]
    fn existing_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!(
            "motion-recorder-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[recording]\nfps = 15\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.recording.fps, 15);
        assert_eq!(config.recording.codec_tag, "MJPG");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let result: Result<Config, _> = toml::from_str("[camera]\ndevice_index = \"zero\"");
        assert!(result.is_err());
    }
}
