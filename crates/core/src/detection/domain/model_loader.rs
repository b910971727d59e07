use crate::detection::domain::face_detector::FaceDetector;

/// Fetches and initializes every model artifact a detector needs.
///
/// Loading may block for a long time (downloads); callers memoize the
/// result rather than calling this twice.
pub trait ModelLoader: Send {
    fn load(&mut self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>>;
}
