//! Accumulates completed runs across the build phase.
//!
//! In plain (non-Top-N) mode every run is kept; no heap is allocated at all.
//! In Top-N mode (`limit_hint = Some(offset + limit)`) a max-heap of
//! "worst admitted row" cursors lets an entire incoming run be discarded
//! without inspecting its rows, once enough rows are already admitted and the
//! candidate's best row can't beat the current worst. Admitted runs are never
//! evicted once kept — only rejected at the door — so the final run set may
//! hold somewhat more rows than strictly necessary; the operator's drain path
//! performs the exact truncation.

use std::collections::BinaryHeap;
use std::sync::Arc;

use super::cursor::{BlockCursor, ForwardCursor, Run};
use vsort_core::sort_key::SortDescription;

pub struct RunSet {
    runs: Vec<Arc<Run>>,
    total_rows: usize,
    limit_hint: Option<usize>,
    pruning_heap: Option<BinaryHeap<ForwardCursor>>,
    description: Arc<SortDescription>,
}

impl RunSet {
    pub fn new(description: Arc<SortDescription>, limit_hint: Option<usize>) -> Self {
        Self {
            runs: Vec::new(),
            total_rows: 0,
            limit_hint,
            pruning_heap: limit_hint.map(|_| BinaryHeap::new()),
            description,
        }
    }

    pub fn runs(&self) -> &[Arc<Run>] {
        &self.runs
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Admit or discard `run` (already sorted by `self.description`).
    pub fn push(&mut self, run: Run) {
        let run = Arc::new(run);
        let rows = run.num_rows();

        let Some(limit_hint) = self.limit_hint else {
            self.total_rows += rows;
            self.runs.push(run);
            return;
        };

        if self.total_rows < limit_hint {
            self.admit(run, rows);
            return;
        }

        if rows == 0 {
            return;
        }

        let best = BlockCursor::new(Arc::clone(&run), Arc::clone(&self.description));
        let heap = self.pruning_heap.as_ref().expect("top-n mode always has a heap");
        let dominated = match heap.peek() {
            Some(worst) => best.current_greater_or_equal_all(&worst.0),
            None => false,
        };

        if dominated {
            return;
        }

        self.admit(run, rows);
    }

    fn admit(&mut self, run: Arc<Run>, rows: usize) {
        self.total_rows += rows;
        if let Some(heap) = &mut self.pruning_heap {
            // `PartialSorter` only guarantees the first `limit_hint` rows of
            // a run are in correct order (the rest are merely partitioned
            // behind them); the last *guaranteed-ordered* row, not the
            // run's literal last row, is the valid dominance bound.
            let bound = self
                .limit_hint
                .map(|hint| hint.min(rows))
                .unwrap_or(rows)
                .saturating_sub(1);
            let mut worst = BlockCursor::new(Arc::clone(&run), Arc::clone(&self.description));
            for _ in 0..bound {
                worst.next();
            }
            heap.push(ForwardCursor(worst));
        }
        self.runs.push(run);
    }

    /// Consume this run set, returning its admitted runs in admission order.
    pub fn into_runs(self) -> Vec<Arc<Run>> {
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsort_core::block::{Block, ColumnData};
    use vsort_core::sort_key::SortKey;
    use vsort_core::types::Scalar;

    fn run_of(values: Vec<i64>) -> Run {
        Run::new(
            Block::from_columns(vec![ColumnData {
                name: "c0".into(),
                values: values.into_iter().map(Scalar::I64).collect(),
            }])
            .unwrap(),
        )
    }

    #[test]
    fn plain_mode_admits_everything() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let mut set = RunSet::new(desc, None);
        set.push(run_of(vec![1, 2]));
        set.push(run_of(vec![3, 4]));
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_rows(), 4);
    }

    #[test]
    fn top_n_discards_dominated_run() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let mut set = RunSet::new(desc, Some(2));
        set.push(run_of(vec![1, 2])); // fills the quota exactly, worst=2
        assert_eq!(set.total_rows(), 2);
        set.push(run_of(vec![5, 6])); // entirely >= 2, discarded
        assert_eq!(set.len(), 1);
        assert_eq!(set.total_rows(), 2);
    }

    #[test]
    fn top_n_admits_competitive_run_even_if_over_quota() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let mut set = RunSet::new(desc, Some(2));
        set.push(run_of(vec![5, 6]));
        set.push(run_of(vec![0, 1])); // beats the worst admitted row, kept
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_rows(), 4);
    }
}
