//! MemoryBudget + RAII guard implementation.
//!
//! Every `RunBuffer::append`/`extract` and the `MergeReader`'s output block
//! allocation acquires a guard before growing; dropping the guard returns the
//! bytes to the budget (panic-safe).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vsort_core::budget::{BudgetGuard, MemoryBudget, ResizableGuard};

use crate::tracking::PeakTracker;

struct BudgetInner {
    capacity: usize,
    used: AtomicUsize,
    peak: PeakTracker,
}

impl BudgetInner {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: AtomicUsize::new(0),
            peak: PeakTracker::new(),
        }
    }

    fn try_acquire(&self, bytes: usize) -> bool {
        loop {
            let cur = self.used.load(Ordering::Relaxed);
            let next = cur.saturating_add(bytes);
            if next > self.capacity {
                return false;
            }
            if self
                .used
                .compare_exchange(cur, next, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                self.peak.record_used(next);
                return true;
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Concrete `MemoryBudget` implementation used by the operator and its tests.
#[derive(Clone)]
pub struct MemoryBudgetImpl {
    inner: Arc<BudgetInner>,
}

impl MemoryBudgetImpl {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            inner: Arc::new(BudgetInner::new(capacity_bytes)),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.inner.used.load(Ordering::Relaxed)
    }

    pub fn capacity_bytes(&self) -> usize {
        self.inner.capacity
    }

    /// High-water mark of `used_bytes()` ever observed by this budget.
    pub fn peak_bytes(&self) -> usize {
        self.inner.peak.peak()
    }
}

/// RAII guard that accounts for a number of bytes; dropping returns them.
pub struct BudgetGuardImpl {
    inner: Arc<BudgetInner>,
    bytes: usize,
    tag: &'static str,
}

impl Drop for BudgetGuardImpl {
    fn drop(&mut self) {
        if self.bytes > 0 {
            self.inner.release(self.bytes);
            self.bytes = 0;
        }
    }
}

impl BudgetGuard for BudgetGuardImpl {
    fn bytes(&self) -> usize {
        self.bytes
    }
    fn tag(&self) -> &'static str {
        self.tag
    }
}

impl ResizableGuard for BudgetGuardImpl {
    /// Resize this guard. Shrinking always succeeds; growing re-checks the
    /// budget for the delta.
    fn try_resize(&mut self, new_bytes: usize) -> bool {
        if new_bytes == self.bytes {
            return true;
        }
        if new_bytes < self.bytes {
            let delta = self.bytes - new_bytes;
            self.inner.release(delta);
            self.bytes = new_bytes;
            true
        } else {
            let delta = new_bytes - self.bytes;
            if self.inner.try_acquire(delta) {
                self.bytes = new_bytes;
                true
            } else {
                false
            }
        }
    }
}

impl MemoryBudget for MemoryBudgetImpl {
    type Guard = BudgetGuardImpl;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard> {
        if bytes == 0 {
            return Some(BudgetGuardImpl {
                inner: Arc::clone(&self.inner),
                bytes: 0,
                tag,
            });
        }
        if self.inner.try_acquire(bytes) {
            Some(BudgetGuardImpl {
                inner: Arc::clone(&self.inner),
                bytes,
                tag,
            })
        } else {
            None
        }
    }

    fn capacity_bytes(&self) -> usize {
        self.inner.capacity
    }

    fn used_bytes(&self) -> usize {
        self.inner.used.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release() {
        let budget = MemoryBudgetImpl::new(100);
        let guard = budget.try_acquire(60, "run").expect("fits");
        assert_eq!(budget.used_bytes(), 60);
        assert!(budget.try_acquire(60, "run").is_none());
        drop(guard);
        assert_eq!(budget.used_bytes(), 0);
    }

    #[test]
    fn peak_bytes_survives_release() {
        let budget = MemoryBudgetImpl::new(100);
        let guard = budget.try_acquire(80, "run").expect("fits");
        drop(guard);
        assert_eq!(budget.used_bytes(), 0);
        assert_eq!(budget.peak_bytes(), 80, "peak should reflect the high-water mark, not the current usage");
    }

    #[test]
    fn resize_grow_and_shrink() {
        let budget = MemoryBudgetImpl::new(100);
        let mut guard = budget.try_acquire(40, "run").unwrap();
        assert!(guard.try_resize(90));
        assert_eq!(budget.used_bytes(), 90);
        assert!(!guard.try_resize(200));
        assert!(guard.try_resize(10));
        assert_eq!(budget.used_bytes(), 10);
    }
}
