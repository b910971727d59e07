use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use facecam_core::capture::infrastructure::ffmpeg_camera::CameraDevice;
use facecam_core::detection::infrastructure::onnx_model_loader::ModelConfig;
use facecam_core::shared::constants::APP_DIR_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

/// User preferences persisted as JSON in the platform config directory.
///
/// Every field has a default so older or hand-edited files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mirror serving every model by file name.
    pub model_base_url: Option<String>,
    pub models_dir: Option<PathBuf>,
    /// Capture device URL; `None` picks the platform default camera.
    pub camera_url: Option<String>,
    pub camera_format: Option<String>,
    /// Detection threshold in percent.
    pub confidence: u32,
    pub analyze_faces: bool,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_base_url: None,
            models_dir: None,
            camera_url: None,
            camera_format: None,
            confidence: 50,
            analyze_faces: true,
            appearance: Appearance::System,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Failed to save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            base_url: self.model_base_url.clone(),
            bundled_dir: self.models_dir.clone(),
            confidence: f64::from(self.confidence.min(100)) / 100.0,
            analyze_faces: self.analyze_faces,
        }
    }

    pub fn camera_device(&self) -> CameraDevice {
        let default = CameraDevice::platform_default();
        CameraDevice {
            input_format: self.camera_format.clone().or(default.input_format),
            url: self.camera_url.clone().unwrap_or(default.url),
        }
    }
}
