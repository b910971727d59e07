use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Derives per-face attributes (age, gender, expressions) for a detection.
///
/// Receives the full frame so each analyzer can choose its own crop
/// margin around `detection.bbox`.
pub trait FaceAnalyzer: Send {
    fn analyze(
        &mut self,
        frame: &Frame,
        detection: &mut Detection,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
