//! Abstract memory budget interfaces.
//!
//! The concrete implementation lives in `vsort-mem`. Only the traits live
//! here so any crate can depend on the API without pulling in the allocator.

/// A guard returned by a memory budget when bytes are acquired.
///
/// The concrete type lives in `vsort-mem`. It must be RAII (releases on
/// Drop), `Send`, and panic-safe.
pub trait BudgetGuard: Send {
    /// Number of bytes currently accounted for by this guard.
    fn bytes(&self) -> usize;
    /// Debug tag for metrics/tracing.
    fn tag(&self) -> &'static str {
        "guard"
    }
}

/// A `BudgetGuard` that can grow or shrink in place instead of being
/// released and re-acquired. `RunBuffer` uses this to track a steadily
/// growing accumulation without a guard churn per appended row.
pub trait ResizableGuard: BudgetGuard {
    /// Resize to `new_bytes`. Shrinking always succeeds; growing re-checks
    /// the owning budget for the delta and fails (no-op) if it doesn't fit.
    fn try_resize(&mut self, new_bytes: usize) -> bool;
}

/// A handle representing a memory-cap enforcer.
///
/// Operators call `try_acquire` before allocating. If `None` is returned,
/// they must back off (the sort operator has no spill path — see Non-goals —
/// so a denied acquisition surfaces as an error to the caller).
pub trait MemoryBudget: Send + Sync + 'static {
    type Guard: BudgetGuard;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard>;
    fn capacity_bytes(&self) -> usize;
    fn used_bytes(&self) -> usize;
}
