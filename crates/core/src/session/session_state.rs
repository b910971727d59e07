use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Running flag plus a generation counter identifying the live session.
///
/// Every start and every stop bumps the generation, so a render loop that
/// captured an older generation can tell it is stale even if the session
/// has since been restarted.
#[derive(Debug, Default)]
pub struct SessionState {
    running: AtomicBool,
    generation: AtomicU64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the session running and returns its new generation.
    pub fn activate(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.running.store(true, Ordering::SeqCst);
        generation
    }

    pub fn deactivate(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True while running under exactly `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && self.generation() == generation
    }
}
