use std::path::PathBuf;

use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::model_loader::ModelLoader;
use crate::detection::infrastructure::analyzing_face_detector::AnalyzingFaceDetector;
use crate::detection::infrastructure::onnx_age_gender_estimator::OnnxAgeGenderEstimator;
use crate::detection::infrastructure::onnx_blazeface_detector::{
    OnnxBlazefaceDetector, DEFAULT_CONFIDENCE,
};
use crate::detection::infrastructure::onnx_emotion_classifier::OnnxEmotionClassifier;
use crate::shared::constants::{
    AGE_GENDER_MODEL_NAME, BLAZEFACE_MODEL_NAME, EMOTION_MODEL_NAME, EMOTION_MODEL_URL,
};
use crate::shared::model_resolver::{self, ProgressFn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelRole {
    FaceDetector,
    AgeGender,
    Emotion,
}

/// One ONNX file the loader needs and where it is published, if anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelArtifact {
    pub name: &'static str,
    pub role: ModelRole,
    pub default_url: Option<&'static str>,
}

pub const BLAZEFACE_ARTIFACT: ModelArtifact = ModelArtifact {
    name: BLAZEFACE_MODEL_NAME,
    role: ModelRole::FaceDetector,
    default_url: None,
};

pub const AGE_GENDER_ARTIFACT: ModelArtifact = ModelArtifact {
    name: AGE_GENDER_MODEL_NAME,
    role: ModelRole::AgeGender,
    default_url: None,
};

pub const EMOTION_ARTIFACT: ModelArtifact = ModelArtifact {
    name: EMOTION_MODEL_NAME,
    role: ModelRole::Emotion,
    default_url: Some(EMOTION_MODEL_URL),
};

/// Which models to fetch and how to run them.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    /// Mirror serving every artifact by file name. Overrides the
    /// per-artifact download locations.
    pub base_url: Option<String>,
    pub bundled_dir: Option<PathBuf>,
    pub confidence: f64,
    /// Also load the age/gender and expression models.
    pub analyze_faces: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bundled_dir: None,
            confidence: DEFAULT_CONFIDENCE,
            analyze_faces: true,
        }
    }
}

impl ModelConfig {
    /// Artifacts this configuration needs, detector first.
    pub fn artifacts(&self) -> Vec<ModelArtifact> {
        let mut artifacts = vec![BLAZEFACE_ARTIFACT];
        if self.analyze_faces {
            artifacts.push(AGE_GENDER_ARTIFACT);
            artifacts.push(EMOTION_ARTIFACT);
        }
        artifacts
    }

    /// Where `artifact` is downloaded from when it is not cached or bundled.
    pub fn download_url(&self, artifact: &ModelArtifact) -> Option<String> {
        match &self.base_url {
            Some(base) => Some(model_resolver::model_url(base, artifact.name)),
            None => artifact.default_url.map(str::to_string),
        }
    }
}

/// Download progress: `(artifact_name, bytes_downloaded, total_bytes)`.
pub type LoadProgressFn = std::sync::Arc<dyn Fn(&str, u64, u64) + Send + Sync>;

/// One-line progress message; `total` is 0 when the size is unknown.
pub fn progress_message(name: &str, downloaded: u64, total: u64) -> String {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        format!("Downloading {name}... {pct}%")
    } else {
        format!("Downloading {name}... {} KB", downloaded / 1024)
    }
}

/// Resolves the configured ONNX artifacts and assembles the detector stack.
pub struct OnnxModelLoader {
    config: ModelConfig,
    progress: Option<LoadProgressFn>,
}

impl OnnxModelLoader {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: LoadProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    fn resolve(&self, artifact: &ModelArtifact) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let name = artifact.name;
        let progress: Option<ProgressFn> = self.progress.clone().map(|cb| {
            Box::new(move |downloaded: u64, total: u64| cb(name, downloaded, total)) as ProgressFn
        });
        let url = self.config.download_url(artifact);
        let path = model_resolver::resolve(
            name,
            url.as_deref(),
            self.config.bundled_dir.as_deref(),
            progress,
        )?;
        log::info!("Resolved model {name} at {}", path.display());
        Ok(path)
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&mut self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
        let mut detector: Option<Box<dyn FaceDetector>> = None;
        let mut analyzers: Vec<Box<dyn FaceAnalyzer>> = Vec::new();

        for artifact in self.config.artifacts() {
            let path = self.resolve(&artifact)?;
            match artifact.role {
                ModelRole::FaceDetector => {
                    detector = Some(Box::new(OnnxBlazefaceDetector::new(
                        &path,
                        self.config.confidence,
                    )?));
                }
                ModelRole::AgeGender => {
                    analyzers.push(Box::new(OnnxAgeGenderEstimator::new(&path)?));
                }
                ModelRole::Emotion => {
                    analyzers.push(Box::new(OnnxEmotionClassifier::new(&path)?));
                }
            }
        }

        let detector = detector.ok_or("no face detector model configured")?;
        if analyzers.is_empty() {
            return Ok(detector);
        }
        Ok(Box::new(AnalyzingFaceDetector::new(detector, analyzers)))
    }
}
