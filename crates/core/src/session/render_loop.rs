use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use crate::capture::live_feed::FrameSource;
use crate::detection::domain::face_detector::FaceDetector;
use crate::render::domain::overlay_surface::SharedSurface;
use crate::render::overlay_renderer::OverlayRenderer;
use crate::session::frame_scheduler::FrameScheduler;
use crate::session::render_stats::RenderStats;
use crate::session::session_state::SessionState;

/// Detector shared by every render loop of a session.
pub type SharedDetector = Arc<Mutex<Box<dyn FaceDetector>>>;

/// What one iteration of the render loop did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The loop's generation is no longer current; it must exit.
    Stopped,
    /// The camera has not produced a frame yet.
    NoFrame,
    /// Annotations for this many faces were drawn.
    Drawn(usize),
    /// Detection finished after the session stopped; nothing was drawn.
    Discarded,
}

/// Detect-then-draw cycle bound to one session generation.
pub struct RenderLoop {
    generation: u64,
    state: Arc<SessionState>,
    source: FrameSource,
    detector: SharedDetector,
    surface: SharedSurface,
    renderer: OverlayRenderer,
    stats: RenderStats,
}

impl RenderLoop {
    pub fn new(
        generation: u64,
        state: Arc<SessionState>,
        source: FrameSource,
        detector: SharedDetector,
        surface: SharedSurface,
    ) -> Self {
        Self {
            generation,
            state,
            source,
            detector,
            surface,
            renderer: OverlayRenderer::default(),
            stats: RenderStats::new(),
        }
    }

    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Runs one detect-and-draw step on the current video frame.
    pub fn run_frame(&mut self) -> Result<FrameOutcome, Box<dyn std::error::Error>> {
        if !self.state.is_current(self.generation) {
            return Ok(FrameOutcome::Stopped);
        }
        let Some(frame) = self.source.latest() else {
            return Ok(FrameOutcome::NoFrame);
        };

        let t0 = Instant::now();
        let detections = {
            let mut detector = self
                .detector
                .lock()
                .map_err(|_| "face detector lock poisoned")?;
            detector.detect(&frame)?
        };
        self.stats
            .timing("detect", t0.elapsed().as_secs_f64() * 1000.0);

        let t0 = Instant::now();
        let mut surface = self
            .surface
            .lock()
            .map_err(|_| "overlay surface lock poisoned")?;
        // Stop bumps the generation before it takes this lock to clear.
        if !self.state.is_current(self.generation) {
            self.stats.record_discarded();
            return Ok(FrameOutcome::Discarded);
        }
        self.renderer
            .render(&mut *surface, &detections, frame.dimensions());
        drop(surface);

        self.stats
            .timing("draw", t0.elapsed().as_secs_f64() * 1000.0);
        self.stats.record_drawn(detections.len());
        Ok(FrameOutcome::Drawn(detections.len()))
    }

    /// Repeats [`run_frame`](Self::run_frame) until the generation goes
    /// stale or detection fails.
    ///
    /// Detection failures end the loop without notifying anyone but the log.
    pub fn run(&mut self, scheduler: &mut dyn FrameScheduler) {
        log::debug!("Render loop {} started", self.generation);
        loop {
            match self.run_frame() {
                Ok(FrameOutcome::Stopped) => break,
                Ok(_) => {}
                Err(e) => {
                    log::error!("Face detection failed, render loop {} ended: {e}", self.generation);
                    break;
                }
            }
            scheduler.wait_for_next_frame();
        }

        match self.stats.summary_string() {
            Some(summary) => log::info!("{summary}"),
            None => log::debug!("Render loop {} ended before any frame", self.generation),
        }
    }

    /// Moves the loop onto its own thread.
    pub fn spawn(
        mut self,
        mut scheduler: Box<dyn FrameScheduler>,
    ) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("render-loop".into())
            .spawn(move || self.run(scheduler.as_mut()))
    }
}
