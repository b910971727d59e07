use std::time::{Duration, Instant};

use crate::shared::constants::DEFAULT_FRAME_RATE;

/// Decides when the render loop may start its next frame.
pub trait FrameScheduler: Send {
    /// Blocks until the next frame slot.
    fn wait_for_next_frame(&mut self);
}

/// Paces frames to a fixed display rate.
///
/// A frame that overran its slot starts the next one immediately instead
/// of trying to catch up.
pub struct DisplayRateScheduler {
    interval: Duration,
    next_due: Option<Instant>,
}

impl DisplayRateScheduler {
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_FRAME_RATE
        };
        Self {
            interval: Duration::from_secs_f64(1.0 / fps),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for DisplayRateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE)
    }
}

impl FrameScheduler for DisplayRateScheduler {
    fn wait_for_next_frame(&mut self) {
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now + self.interval);
        if due > now {
            std::thread::sleep(due - now);
            self.next_due = Some(due + self.interval);
        } else {
            self.next_due = Some(now + self.interval);
        }
    }
}

/// Runs frames back to back, yielding the thread in between.
#[derive(Default)]
pub struct ImmediateScheduler;

impl FrameScheduler for ImmediateScheduler {
    fn wait_for_next_frame(&mut self) {
        std::thread::yield_now();
    }
}
