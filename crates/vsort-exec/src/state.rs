//! A concrete `RuntimeState` for driving a `SortOperator` outside of a full
//! engine: a batch-size hint, a best-effort cancellation flag, and an
//! optional tracer handle.

use std::sync::atomic::{AtomicBool, Ordering};

use vsort_operators::sort::{RuntimeState, SortError, Tracer};

pub struct DefaultRuntimeState {
    batch_size: usize,
    cancelled: AtomicBool,
    tracer: Option<Tracer>,
}

impl DefaultRuntimeState {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            cancelled: AtomicBool::new(false),
            tracer: None,
        }
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Request cancellation; observed at the operator's next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl RuntimeState for DefaultRuntimeState {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn check_query_state(&self) -> Result<(), SortError> {
        if self.cancelled.load(Ordering::Acquire) {
            Err(SortError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn tracer(&self) -> Option<&Tracer> {
        self.tracer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_observed() {
        let state = DefaultRuntimeState::new(1024);
        assert!(!state.is_cancelled());
        state.cancel();
        assert!(state.is_cancelled());
        assert!(state.check_query_state().is_err());
    }
}
