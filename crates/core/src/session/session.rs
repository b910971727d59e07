use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::capture::domain::camera::{Camera, CameraRequest};
use crate::capture::live_feed::{FrameSource, LiveFeed};
use crate::detection::domain::model_loader::ModelLoader;
use crate::render::domain::overlay_surface::SharedSurface;
use crate::render::layout::CanvasSize;
use crate::render::overlay_renderer::{OverlayRenderer, OverlayStyle};
use crate::session::events::{EventBus, SessionEvent, Subscription};
use crate::session::frame_scheduler::{DisplayRateScheduler, FrameScheduler, ImmediateScheduler};
use crate::session::render_loop::{RenderLoop, SharedDetector};
use crate::session::session_state::SessionState;
use crate::shared::constants::DEFAULT_FRAME_RATE;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to load face models: {0}")]
    ModelLoad(String),
    #[error("failed to start worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Result of a successful [`Session::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Started,
    Stopped,
    /// The camera refused to open; the session stayed idle.
    CameraUnavailable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub camera_request: CameraRequest,
    /// Render loop pace; `None` runs frames back to back.
    pub frame_rate: Option<f64>,
    pub style: OverlayStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera_request: CameraRequest::user_video(),
            frame_rate: Some(DEFAULT_FRAME_RATE),
            style: OverlayStyle::default(),
        }
    }
}

/// Owns everything a running webcam overlay needs: the camera, the
/// memoized detector, the live feed, the overlay surface and the event bus.
///
/// A single [`toggle`](Self::toggle) drives the Idle/Active state machine.
pub struct Session {
    camera: Box<dyn Camera>,
    loader: Box<dyn ModelLoader>,
    detector: Option<SharedDetector>,
    feed: Option<LiveFeed>,
    state: Arc<SessionState>,
    video: FrameSource,
    surface: SharedSurface,
    events: EventBus,
    config: SessionConfig,
    loops: Vec<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        camera: Box<dyn Camera>,
        loader: Box<dyn ModelLoader>,
        surface: SharedSurface,
        config: SessionConfig,
    ) -> Self {
        Self {
            camera,
            loader,
            detector: None,
            feed: None,
            state: Arc::new(SessionState::new()),
            video: FrameSource::new(),
            surface,
            events: EventBus::new(),
            config,
            loops: Vec::new(),
        }
    }

    /// Starts the camera when idle, stops it when active.
    ///
    /// Models are loaded on the first call only. A camera that cannot be
    /// opened is reported through [`SessionEvent::CameraUnavailable`] and
    /// leaves the session idle.
    pub fn toggle(&mut self) -> Result<Transition, SessionError> {
        let detector = self.ensure_models()?;

        if self.state.is_running() {
            self.stop();
            return Ok(Transition::Stopped);
        }
        self.start(detector)
    }

    /// Resizes the overlay, discarding whatever it showed.
    pub fn resize(&self, size: CanvasSize) {
        self.surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resize(size.width, size.height);
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn models_loaded(&self) -> bool {
        self.detector.is_some()
    }

    /// The live video as the UI should display it.
    pub fn video(&self) -> FrameSource {
        self.video.clone()
    }

    pub fn surface(&self) -> SharedSurface {
        self.surface.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ensure_models(&mut self) -> Result<SharedDetector, SessionError> {
        if let Some(detector) = &self.detector {
            return Ok(detector.clone());
        }

        self.events.emit(SessionEvent::LoadingChanged(true));
        log::info!("Loading face models");
        let detector = self.loader.load().map_err(|e| {
            log::error!("Failed to load face models: {e}");
            SessionError::ModelLoad(e.to_string())
        })?;

        let shared: SharedDetector = Arc::new(Mutex::new(detector));
        self.detector = Some(shared.clone());
        self.events.emit(SessionEvent::LoadingChanged(false));
        log::info!("Face models loaded");
        Ok(shared)
    }

    fn start(&mut self, detector: SharedDetector) -> Result<Transition, SessionError> {
        let stream = match self.camera.open(&self.config.camera_request) {
            Ok(stream) => stream,
            Err(e) => {
                log::error!("Error accessing camera: {e}");
                self.events
                    .emit(SessionEvent::CameraUnavailable(camera_alert(&e.to_string())));
                return Ok(Transition::CameraUnavailable);
            }
        };

        self.loops.retain(|handle| !handle.is_finished());
        self.feed = Some(LiveFeed::start(stream, self.video.clone()).map_err(SessionError::Spawn)?);

        let generation = self.state.activate();
        self.events.emit(SessionEvent::RunningChanged(true));

        let render_loop = RenderLoop::new(
            generation,
            self.state.clone(),
            self.video.clone(),
            detector,
            self.surface.clone(),
        )
        .with_renderer(OverlayRenderer::new(self.config.style));

        match render_loop.spawn(self.scheduler()) {
            Ok(handle) => self.loops.push(handle),
            Err(e) => {
                self.stop();
                return Err(SessionError::Spawn(e));
            }
        }
        log::info!("Camera started (generation {generation})");
        Ok(Transition::Started)
    }

    fn stop(&mut self) {
        self.state.deactivate();
        // After deactivate, so an in-flight draw either finished already or
        // sees the stale generation once it gets the lock. Before the feed
        // join, which waits on the camera.
        self.surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
        }
        self.video.clear();
        self.events.emit(SessionEvent::RunningChanged(false));
        log::info!("Camera stopped");
    }

    fn scheduler(&self) -> Box<dyn FrameScheduler> {
        match self.config.frame_rate {
            Some(fps) => Box::new(DisplayRateScheduler::new(fps)),
            None => Box::new(ImmediateScheduler),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state.is_running() {
            self.stop();
        }
    }
}

fn camera_alert(reason: &str) -> String {
    format!("Error accessing camera. Please make sure you have granted permission. ({reason})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use crate::capture::domain::camera::{CameraError, CameraStream};
    use crate::detection::domain::detection::Detection;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::render::display_list::DisplayList;
    use crate::render::domain::overlay_surface::OverlaySurface;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::frame::Frame;

    struct FakeStream {
        index: usize,
        released: Arc<AtomicBool>,
        /// When set, every read after the first blocks until this fires.
        stall: Option<crossbeam_channel::Receiver<()>>,
    }

    impl CameraStream for FakeStream {
        fn dimensions(&self) -> (u32, u32) {
            (64, 48)
        }

        fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            if let Some(stall) = &self.stall {
                if self.index > 0 {
                    let _ = stall.recv();
                    return Ok(None);
                }
            }
            std::thread::sleep(Duration::from_millis(2));
            self.index += 1;
            Ok(Some(Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, 3, self.index)))
        }

        fn stop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Clone, Default)]
    struct FakeCamera {
        deny: Arc<AtomicBool>,
        opens: Arc<AtomicUsize>,
        released: Arc<AtomicBool>,
        last_request: Arc<Mutex<Option<CameraRequest>>>,
        stall: Arc<Mutex<Option<crossbeam_channel::Receiver<()>>>>,
    }

    impl Camera for FakeCamera {
        fn open(&mut self, request: &CameraRequest) -> Result<Box<dyn CameraStream>, CameraError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.deny.load(Ordering::SeqCst) {
                return Err(CameraError::PermissionDenied);
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.released.store(false, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                index: 0,
                released: self.released.clone(),
                stall: self.stall.lock().unwrap().clone(),
            }))
        }
    }

    struct OneFaceDetector;

    impl FaceDetector for OneFaceDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Ok(vec![
                Detection::new(BoundingBox::new(10.0, 20.0, 20.0, 20.0), 0.9).with_age(23.6)
            ])
        }
    }

    #[derive(Clone, Default)]
    struct FakeLoader {
        loads: Arc<AtomicUsize>,
        failures_left: Arc<AtomicUsize>,
    }

    impl ModelLoader for FakeLoader {
        fn load(&mut self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err("network unreachable".into());
            }
            Ok(Box::new(OneFaceDetector))
        }
    }

    struct Harness {
        session: Session,
        camera: FakeCamera,
        loader: FakeLoader,
        surface: Arc<Mutex<DisplayList>>,
    }

    fn harness() -> Harness {
        let camera = FakeCamera::default();
        let loader = FakeLoader::default();
        let surface = Arc::new(Mutex::new(DisplayList::new(128, 96)));
        let config = SessionConfig {
            frame_rate: Some(200.0),
            ..SessionConfig::default()
        };
        let session = Session::new(
            Box::new(camera.clone()),
            Box::new(loader.clone()),
            surface.clone(),
            config,
        );
        Harness {
            session,
            camera,
            loader,
            surface,
        }
    }

    fn wait_until(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn test_starts_idle() {
        let h = harness();
        assert!(!h.session.is_running());
        assert!(!h.session.models_loaded());
    }

    #[test]
    fn test_toggle_parity() {
        let mut h = harness();
        for i in 1..=6 {
            h.session.toggle().unwrap();
            assert_eq!(h.session.is_running(), i % 2 == 1, "after {i} toggles");
        }
    }

    #[test]
    fn test_models_loaded_once() {
        let mut h = harness();
        for _ in 0..5 {
            h.session.toggle().unwrap();
        }
        assert_eq!(h.loader.loads.load(Ordering::SeqCst), 1);
        assert!(h.session.models_loaded());
    }

    #[test]
    fn test_requests_user_facing_video_without_audio() {
        let mut h = harness();
        h.session.toggle().unwrap();
        let request = h.camera.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request, CameraRequest::user_video());
        assert!(!request.audio);
    }

    #[test]
    fn test_first_toggle_event_sequence() {
        let mut h = harness();
        let events = h.session.subscribe();

        assert_eq!(h.session.toggle().unwrap(), Transition::Started);
        assert_eq!(
            events.drain(),
            vec![
                SessionEvent::LoadingChanged(true),
                SessionEvent::LoadingChanged(false),
                SessionEvent::RunningChanged(true),
            ]
        );

        assert_eq!(h.session.toggle().unwrap(), Transition::Stopped);
        assert_eq!(events.drain(), vec![SessionEvent::RunningChanged(false)]);
    }

    #[test]
    fn test_camera_failure_keeps_session_idle() {
        let mut h = harness();
        h.camera.deny.store(true, Ordering::SeqCst);
        let events = h.session.subscribe();

        assert_eq!(h.session.toggle().unwrap(), Transition::CameraUnavailable);

        assert!(!h.session.is_running());
        let received = events.drain();
        assert!(matches!(
            received.last(),
            Some(SessionEvent::CameraUnavailable(msg)) if msg.contains("Error accessing camera")
        ));
        assert!(!received.contains(&SessionEvent::RunningChanged(true)));
    }

    #[test]
    fn test_camera_failure_does_not_count_toward_parity() {
        let mut h = harness();
        h.camera.deny.store(true, Ordering::SeqCst);
        h.session.toggle().unwrap();
        h.camera.deny.store(false, Ordering::SeqCst);

        assert_eq!(h.session.toggle().unwrap(), Transition::Started);
        assert!(h.session.is_running());
    }

    #[test]
    fn test_model_failure_leaves_loading_and_retries() {
        let mut h = harness();
        h.loader.failures_left.store(1, Ordering::SeqCst);
        let events = h.session.subscribe();

        let err = h.session.toggle().unwrap_err();
        assert!(matches!(err, SessionError::ModelLoad(ref m) if m.contains("network unreachable")));
        assert!(!h.session.is_running());
        assert_eq!(events.drain(), vec![SessionEvent::LoadingChanged(true)]);
        assert_eq!(h.camera.opens.load(Ordering::SeqCst), 0);

        assert_eq!(h.session.toggle().unwrap(), Transition::Started);
        assert_eq!(h.loader.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_running_session_draws_annotations() {
        let mut h = harness();
        h.session.toggle().unwrap();

        let surface = h.surface.clone();
        assert!(wait_until(|| !surface.lock().unwrap().is_empty()));
        assert!(surface
            .lock()
            .unwrap()
            .labels()
            .contains(&"Age: 24 years"));
    }

    #[test]
    fn test_stop_clears_overlay_and_releases_camera() {
        let mut h = harness();
        h.session.toggle().unwrap();
        let surface = h.surface.clone();
        assert!(wait_until(|| !surface.lock().unwrap().is_empty()));

        h.session.toggle().unwrap();

        assert!(h.surface.lock().unwrap().is_empty());
        assert!(h.camera.released.load(Ordering::SeqCst));
        assert!(h.session.video().latest().is_none());

        // A straggling loop must not draw after the stop
        std::thread::sleep(Duration::from_millis(30));
        assert!(h.surface.lock().unwrap().is_empty());
    }

    #[test]
    fn test_stop_clears_overlay_while_camera_stalls() {
        let h = harness();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        *h.camera.stall.lock().unwrap() = Some(release_rx);
        let surface = h.surface.clone();
        let mut session = h.session;

        session.toggle().unwrap();
        assert!(wait_until(|| !surface.lock().unwrap().is_empty()));

        let stopper = std::thread::spawn(move || {
            let transition = session.toggle().unwrap();
            (session, transition)
        });

        // The feed is still blocked in read_frame, yet the overlay is gone
        assert!(wait_until(|| surface.lock().unwrap().is_empty()));
        assert!(!stopper.is_finished());

        release_tx.send(()).unwrap();
        let (session, transition) = stopper.join().unwrap();
        assert_eq!(transition, Transition::Stopped);
        assert!(!session.is_running());
        assert!(surface.lock().unwrap().is_empty());
    }

    #[test]
    fn test_resize_sets_size_and_clears() {
        let h = harness();
        h.surface
            .lock()
            .unwrap()
            .stroke_rect(&BoundingBox::new(0.0, 0.0, 1.0, 1.0), &OverlayStyle::default().stroke);

        h.session.resize(CanvasSize::new(1000, 563));

        let surface = h.surface.lock().unwrap();
        assert_eq!(surface.size(), (1000, 563));
        assert!(surface.is_empty());
    }

    #[test]
    fn test_drop_releases_camera() {
        let h = harness();
        let Harness {
            mut session,
            camera,
            ..
        } = h;
        session.toggle().unwrap();
        drop(session);
        assert!(camera.released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_camera_alert_mentions_permission() {
        let msg = camera_alert("camera access was denied");
        assert!(msg.starts_with("Error accessing camera."));
        assert!(msg.contains("permission"));
    }
}
