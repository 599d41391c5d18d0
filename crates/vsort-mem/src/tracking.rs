//! Lightweight peak-usage tracking hook.
//!
//! `MemoryBudgetImpl` updates one of these on every successful acquisition
//! (direct or via `ResizableGuard::try_resize`'s growth path), so
//! `MemoryBudgetImpl::peak_bytes()` reflects a true high-water mark rather
//! than just the current `used_bytes()`. Kept cheap and backend-agnostic —
//! the host engine is free to also poll `peak()` into its own metrics sink.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct PeakTracker {
    peak_bytes: AtomicUsize,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self {
            peak_bytes: AtomicUsize::new(0),
        }
    }

    /// Record a new "used bytes" observation; updates the peak if higher.
    pub fn record_used(&self, used_bytes: usize) {
        let mut cur = self.peak_bytes.load(Ordering::Relaxed);
        while used_bytes > cur {
            match self.peak_bytes.compare_exchange(
                cur,
                used_bytes,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => cur = observed,
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(used_bytes, peak = self.peak_bytes.load(Ordering::Relaxed), "mem usage");
    }

    pub fn peak(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_high_water_mark() {
        let t = PeakTracker::new();
        t.record_used(10);
        t.record_used(5);
        t.record_used(20);
        assert_eq!(t.peak(), 20);
    }
}
