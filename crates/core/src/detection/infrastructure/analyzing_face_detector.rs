use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;

/// Decorator that runs every analyzer on every face the inner detector finds.
///
/// Analyzers run in registration order; the first failure aborts the frame.
pub struct AnalyzingFaceDetector {
    inner: Box<dyn FaceDetector>,
    analyzers: Vec<Box<dyn FaceAnalyzer>>,
}

impl AnalyzingFaceDetector {
    pub fn new(inner: Box<dyn FaceDetector>, analyzers: Vec<Box<dyn FaceAnalyzer>>) -> Self {
        Self { inner, analyzers }
    }
}

impl FaceDetector for AnalyzingFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let mut detections = self.inner.detect(frame)?;
        for detection in &mut detections {
            for analyzer in &mut self.analyzers {
                analyzer.analyze(frame, detection)?;
            }
        }
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::expressions::Expressions;
    use crate::shared::bounding_box::BoundingBox;

    struct FixedDetector(Vec<Detection>);

    impl FaceDetector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Ok(self.0.clone())
        }
    }

    struct AgeAnalyzer(f32);

    impl FaceAnalyzer for AgeAnalyzer {
        fn analyze(
            &mut self,
            _frame: &Frame,
            detection: &mut Detection,
        ) -> Result<(), Box<dyn std::error::Error>> {
            detection.age = Some(self.0);
            Ok(())
        }
    }

    struct MoodAnalyzer;

    impl FaceAnalyzer for MoodAnalyzer {
        fn analyze(
            &mut self,
            _frame: &Frame,
            detection: &mut Detection,
        ) -> Result<(), Box<dyn std::error::Error>> {
            detection.expressions = Some(Expressions::from_scores([("happy", 1.0)]));
            Ok(())
        }
    }

    struct FailingAnalyzer;

    impl FaceAnalyzer for FailingAnalyzer {
        fn analyze(
            &mut self,
            _frame: &Frame,
            _detection: &mut Detection,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Err("inference failed".into())
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 100 * 100 * 3], 100, 100, 3, 0)
    }

    fn faces(n: usize) -> Vec<Detection> {
        (0..n)
            .map(|i| Detection::new(BoundingBox::new(i as f64 * 20.0, 0.0, 10.0, 10.0), 0.9))
            .collect()
    }

    #[test]
    fn test_all_analyzers_applied_to_each_face() {
        let mut detector = AnalyzingFaceDetector::new(
            Box::new(FixedDetector(faces(2))),
            vec![Box::new(AgeAnalyzer(31.0)), Box::new(MoodAnalyzer)],
        );

        let detections = detector.detect(&frame()).unwrap();

        assert_eq!(detections.len(), 2);
        for d in &detections {
            assert_eq!(d.rounded_age(), Some(31));
            assert_eq!(d.dominant_expression(), Some("happy"));
        }
    }

    #[test]
    fn test_no_faces_skips_analyzers() {
        let mut detector = AnalyzingFaceDetector::new(
            Box::new(FixedDetector(vec![])),
            vec![Box::new(FailingAnalyzer)],
        );
        assert!(detector.detect(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_analyzer_failure_propagates() {
        let mut detector = AnalyzingFaceDetector::new(
            Box::new(FixedDetector(faces(1))),
            vec![Box::new(FailingAnalyzer)],
        );
        assert!(detector.detect(&frame()).is_err());
    }

    #[test]
    fn test_without_analyzers_passes_through() {
        let expected = faces(3);
        let mut detector =
            AnalyzingFaceDetector::new(Box::new(FixedDetector(expected.clone())), vec![]);
        assert_eq!(detector.detect(&frame()).unwrap(), expected);
    }
}
