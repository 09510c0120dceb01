use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Redraw request flag shared by every producer. Requests coalesce: the
/// render loop draws once per `take()` that returns true.
#[derive(Clone, Default)]
pub struct Redraw {
    pending: Arc<AtomicBool>,
    requests: Arc<AtomicU64>,
}

impl Redraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether a draw was pending
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Total number of requests since creation
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}
