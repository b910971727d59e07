use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::capture::domain::camera::CameraStream;
use crate::shared::frame::Frame;

/// Slot holding the most recent camera frame.
///
/// Readers always see the current picture, never a backlog; cloning shares
/// the slot.
#[derive(Clone, Default)]
pub struct FrameSource {
    latest: Arc<Mutex<Option<Arc<Frame>>>>,
}

impl FrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: Frame) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(frame));
    }

    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Pumps frames from an open camera into a [`FrameSource`] on a
/// background thread.
pub struct LiveFeed {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LiveFeed {
    pub fn start(mut stream: Box<dyn CameraStream>, source: FrameSource) -> std::io::Result<Self> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = stop_flag.clone();

        let handle = std::thread::Builder::new()
            .name("live-feed".into())
            .spawn(move || {
                let mut count = 0usize;
                while !flag.load(Ordering::Relaxed) {
                    match stream.read_frame() {
                        Ok(Some(frame)) => {
                            source.publish(frame);
                            count += 1;
                        }
                        Ok(None) => {
                            log::info!("Camera source ended after {count} frames");
                            break;
                        }
                        Err(e) => {
                            log::error!("Camera read failed: {e}");
                            break;
                        }
                    }
                }
                stream.stop();
                log::debug!("Live feed released camera after {count} frames");
            })?;

        Ok(Self {
            stop_flag,
            handle: Some(handle),
        })
    }

    /// Signals the reader thread and waits until the camera is released.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Live feed thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    /// Endless stream of tiny frames that records when it is stopped.
    struct FakeStream {
        next_index: usize,
        limit: Option<usize>,
        stopped: Arc<AtomicBool>,
        reads: Arc<AtomicUsize>,
    }

    impl CameraStream for FakeStream {
        fn dimensions(&self) -> (u32, u32) {
            (2, 2)
        }

        fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            if self.limit.is_some_and(|l| self.next_index >= l) {
                return Ok(None);
            }
            std::thread::sleep(Duration::from_millis(1));
            self.reads.fetch_add(1, Ordering::SeqCst);
            let frame = Frame::new(vec![0u8; 12], 2, 2, 3, self.next_index);
            self.next_index += 1;
            Ok(Some(frame))
        }

        fn stop(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    fn fake(limit: Option<usize>) -> (Box<FakeStream>, Arc<AtomicBool>, Arc<AtomicUsize>) {
        let stopped = Arc::new(AtomicBool::new(false));
        let reads = Arc::new(AtomicUsize::new(0));
        let stream = Box::new(FakeStream {
            next_index: 0,
            limit,
            stopped: stopped.clone(),
            reads: reads.clone(),
        });
        (stream, stopped, reads)
    }

    fn wait_until(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_frame_source_starts_empty() {
        assert!(FrameSource::new().latest().is_none());
    }

    #[test]
    fn test_frame_source_keeps_only_latest() {
        let source = FrameSource::new();
        source.publish(Frame::new(vec![0u8; 3], 1, 1, 3, 0));
        source.publish(Frame::new(vec![0u8; 3], 1, 1, 3, 1));
        assert_eq!(source.latest().unwrap().index(), 1);

        source.clear();
        assert!(source.latest().is_none());
    }

    #[test]
    fn test_clones_share_slot() {
        let source = FrameSource::new();
        let reader = source.clone();
        source.publish(Frame::new(vec![0u8; 3], 1, 1, 3, 7));
        assert_eq!(reader.latest().unwrap().index(), 7);
    }

    #[test]
    fn test_feed_publishes_frames() {
        let (stream, _, reads) = fake(None);
        let source = FrameSource::new();
        let mut feed = LiveFeed::start(stream, source.clone()).unwrap();

        wait_until(|| reads.load(Ordering::SeqCst) >= 3);
        assert!(source.latest().is_some());
        feed.stop();
    }

    #[test]
    fn test_stop_releases_camera_synchronously() {
        let (stream, stopped, _) = fake(None);
        let mut feed = LiveFeed::start(stream, FrameSource::new()).unwrap();

        feed.stop();

        assert!(stopped.load(Ordering::SeqCst));
        assert!(!feed.is_running());
    }

    #[test]
    fn test_finite_source_ends_and_releases() {
        let (stream, stopped, _) = fake(Some(2));
        let source = FrameSource::new();
        let feed = LiveFeed::start(stream, source.clone()).unwrap();

        wait_until(|| stopped.load(Ordering::SeqCst));
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(source.latest().unwrap().index(), 1);
        drop(feed);
    }

    #[test]
    fn test_drop_stops_feed() {
        let (stream, stopped, _) = fake(None);
        let feed = LiveFeed::start(stream, FrameSource::new()).unwrap();
        drop(feed);
        assert!(stopped.load(Ordering::SeqCst));
    }
}
