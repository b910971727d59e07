use thiserror::Error;

use crate::shared::frame::Frame;

/// Which physical camera to prefer on devices that have several.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

/// Constraints passed to [`Camera::open`].
///
/// Dimensions and frame rate are hints; the device may pick the closest
/// mode it supports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraRequest {
    pub facing_mode: FacingMode,
    pub audio: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
}

impl CameraRequest {
    /// Front-facing video without audio.
    pub fn user_video() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera access was denied")]
    PermissionDenied,
    #[error("no camera found at {0}")]
    NoDevice(String),
    #[error("audio capture is not supported")]
    AudioUnsupported,
    #[error("failed to open camera: {0}")]
    Open(String),
}

/// Acquires camera streams.
pub trait Camera: Send {
    fn open(&mut self, request: &CameraRequest) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// An open camera producing RGB frames.
pub trait CameraStream: Send {
    /// Native `(width, height)` of the frames this stream produces.
    fn dimensions(&self) -> (u32, u32);

    /// Blocks until the next frame is decoded.
    ///
    /// `Ok(None)` marks the end of a finite source such as a file.
    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the device. Idempotent.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_is_user_video_only() {
        let request = CameraRequest::user_video();
        assert_eq!(request.facing_mode, FacingMode::User);
        assert!(!request.audio);
        assert_eq!(request.width, None);
    }

    #[test]
    fn test_builder_sets_hints() {
        let request = CameraRequest::user_video().with_size(1280, 720).with_fps(30);
        assert_eq!(request.width, Some(1280));
        assert_eq!(request.height, Some(720));
        assert_eq!(request.fps, Some(30));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CameraError::NoDevice("/dev/video0".into()).to_string(),
            "no camera found at /dev/video0"
        );
        assert_eq!(
            CameraError::PermissionDenied.to_string(),
            "camera access was denied"
        );
    }
}
