use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::Receiver;

use facecam_core::session::session::{Session, SessionError, Transition};

pub type ToggleResult = Result<Transition, SessionError>;

/// Runs one start/stop off the UI thread.
///
/// Starting may download and load models, which takes seconds; the UI
/// polls the returned channel and keeps redrawing in the meantime.
pub fn spawn_toggle(session: Arc<Mutex<Session>>) -> Receiver<ToggleResult> {
    let (tx, rx) = crossbeam_channel::bounded(1);

    std::thread::spawn(move || {
        let result = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .toggle();
        if let Err(e) = &result {
            log::error!("Toggle failed: {e}");
        }
        let _ = tx.send(result);
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use facecam_core::capture::domain::camera::{Camera, CameraError, CameraRequest, CameraStream};
    use facecam_core::detection::domain::face_detector::FaceDetector;
    use facecam_core::detection::domain::model_loader::ModelLoader;
    use facecam_core::render::display_list::DisplayList;
    use facecam_core::session::session::SessionConfig;

    struct NoCamera;

    impl Camera for NoCamera {
        fn open(&mut self, _request: &CameraRequest) -> Result<Box<dyn CameraStream>, CameraError> {
            Err(CameraError::PermissionDenied)
        }
    }

    struct BrokenLoader;

    impl ModelLoader for BrokenLoader {
        fn load(&mut self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
            Err("download failed".into())
        }
    }

    fn session(loader: Box<dyn ModelLoader>) -> Arc<Mutex<Session>> {
        Arc::new(Mutex::new(Session::new(
            Box::new(NoCamera),
            loader,
            Arc::new(Mutex::new(DisplayList::new(10, 10))),
            SessionConfig::default(),
        )))
    }

    #[test]
    fn test_load_failure_is_reported() {
        let rx = spawn_toggle(session(Box::new(BrokenLoader)));
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match result {
            Err(SessionError::ModelLoad(reason)) => assert!(reason.contains("download failed")),
            other => panic!("expected a model load error, got {other:?}"),
        }
    }
}
