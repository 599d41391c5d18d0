//! Drains the admitted run set in final sort order, honoring `offset`.
//!
//! Two paths:
//! - a single admitted run never needs a heap at all: `emit_batch` just
//!   slices the next `target_rows` window off it (zero-copy, via
//!   `Block::slice`);
//! - two or more runs go through a k-way merge keyed by the same
//!   `compare_row` comparator everything else in this module uses, via a
//!   min-heap of `ReverseCursor`s.

use std::collections::BinaryHeap;
use std::sync::Arc;

use vsort_core::block::{Block, BlockBuilder};
use vsort_core::budget::{BudgetGuard, MemoryBudget};
use vsort_core::sort_key::SortDescription;

use super::cursor::{BlockCursor, ReverseCursor, Run};
use super::error::{Result, SortError};

enum Source {
    Single { block: Block, pos: usize },
    Merge { heap: BinaryHeap<ReverseCursor> },
}

pub struct MergeReader {
    runs: Vec<Arc<Run>>,
    description: Arc<SortDescription>,
    initial_offset: usize,
    source: Source,
    column_names: Vec<String>,
    skip_remaining: usize,
    /// Guard backing the most recently materialized merged output batch.
    /// Replaced (dropping the previous one) on every `emit_merged` call, and
    /// dropped outright when the reader itself is dropped. The single-run
    /// fast path never allocates, so it never needs one.
    output_guard: Option<Box<dyn BudgetGuard>>,
}

impl MergeReader {
    /// `offset` rows of the final ordering are skipped before the first row
    /// is ever emitted.
    pub fn new(runs: Vec<Arc<Run>>, description: Arc<SortDescription>, offset: usize) -> Self {
        let column_names = runs
            .first()
            .map(|r| r.block.column_names())
            .unwrap_or_default();
        let source = Self::build_source(&runs, &description, &column_names);

        Self {
            runs,
            description,
            initial_offset: offset,
            source,
            column_names,
            skip_remaining: offset,
            output_guard: None,
        }
    }

    fn build_source(runs: &[Arc<Run>], description: &Arc<SortDescription>, column_names: &[String]) -> Source {
        if runs.len() <= 1 {
            let block = runs
                .first()
                .map(|r| r.block.clone())
                .unwrap_or_else(|| Block::empty(column_names.to_vec()));
            Source::Single { block, pos: 0 }
        } else {
            let mut heap = BinaryHeap::new();
            for run in runs {
                if run.num_rows() > 0 {
                    heap.push(ReverseCursor(BlockCursor::new(Arc::clone(run), Arc::clone(description))));
                }
            }
            Source::Merge { heap }
        }
    }

    /// Reposition back to the start of the same admitted run set, re-applying
    /// the original `offset`. Used by `SortOperator::reset` to replay the
    /// same output without rebuilding runs.
    pub fn rewind(&mut self) {
        self.source = Self::build_source(&self.runs, &self.description, &self.column_names);
        self.skip_remaining = self.initial_offset;
        self.output_guard = None;
    }

    /// Produce up to `target_rows` more rows in final order, or `None` once
    /// exhausted. The single-run fast path slices zero-copy and needs no
    /// budget; the k-way merge path materializes a new block and charges its
    /// bytes against `budget` for as long as this reader holds it.
    pub fn emit_batch<M: MemoryBudget>(&mut self, target_rows: usize, budget: &M) -> Result<Option<Block>> {
        if matches!(self.source, Source::Single { .. }) {
            Ok(self.emit_single(target_rows))
        } else {
            self.emit_merged(target_rows, budget)
        }
    }

    fn emit_single(&mut self, target_rows: usize) -> Option<Block> {
        let Source::Single { block, pos } = &mut self.source else {
            unreachable!()
        };

        while self.skip_remaining > 0 && *pos < block.num_rows() {
            let step = self.skip_remaining.min(block.num_rows() - *pos);
            *pos += step;
            self.skip_remaining -= step;
        }

        let remaining = block.num_rows() - *pos;
        if remaining == 0 {
            return None;
        }
        let take = target_rows.min(remaining);
        let out = block.slice(*pos, take);
        *pos += take;
        Some(out)
    }

    fn emit_merged<M: MemoryBudget>(&mut self, target_rows: usize, budget: &M) -> Result<Option<Block>> {
        let Source::Merge { heap } = &mut self.source else {
            unreachable!()
        };

        if heap.is_empty() {
            self.output_guard = None;
            return Ok(None);
        }

        let mut builder = BlockBuilder::with_capacity(self.column_names.clone(), target_rows);
        while builder.num_rows() < target_rows {
            let Some(ReverseCursor(mut cursor)) = heap.pop() else {
                break;
            };

            if self.skip_remaining > 0 {
                self.skip_remaining -= 1;
            } else {
                builder.push_row_from(&cursor.run().block, cursor.pos());
            }

            cursor.next();
            if !cursor.is_exhausted() {
                heap.push(ReverseCursor(cursor));
            }
        }

        if builder.num_rows() == 0 {
            self.output_guard = None;
            return Ok(None);
        }
        let block = builder.finish().expect("columns agree by construction");
        let bytes = block.approx_bytes();
        let guard = budget.try_acquire(bytes, "merge_output").ok_or_else(|| {
            SortError::Internal(format!(
                "memory budget exceeded while materializing merge output: {bytes} bytes requested"
            ))
        })?;
        self.output_guard = Some(Box::new(guard));
        Ok(Some(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsort_core::block::ColumnData;
    use vsort_core::sort_key::SortKey;
    use vsort_core::types::Scalar;

    fn run_of(values: Vec<i64>) -> Arc<Run> {
        Arc::new(Run::new(
            Block::from_columns(vec![ColumnData {
                name: "c0".into(),
                values: values.into_iter().map(Scalar::I64).collect(),
            }])
            .unwrap(),
        ))
    }

    fn test_budget() -> vsort_mem::MemoryBudgetImpl {
        vsort_mem::MemoryBudgetImpl::new(16 * 1024 * 1024)
    }

    fn drain_all(reader: &mut MergeReader, target_rows: usize, budget: &vsort_mem::MemoryBudgetImpl) -> Vec<i64> {
        let mut out = Vec::new();
        while let Some(block) = reader.emit_batch(target_rows, budget).unwrap() {
            for r in 0..block.num_rows() {
                match block.value(0, r) {
                    Scalar::I64(v) => out.push(*v),
                    _ => unreachable!(),
                }
            }
        }
        out
    }

    #[test]
    fn single_run_fast_path_respects_offset() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let budget = test_budget();
        let mut reader = MergeReader::new(vec![run_of(vec![1, 2, 3, 4])], desc, 1);
        assert_eq!(drain_all(&mut reader, 10, &budget), vec![2, 3, 4]);
    }

    #[test]
    fn merges_two_runs_in_order() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let budget = test_budget();
        let runs = vec![run_of(vec![1, 3, 5]), run_of(vec![2, 4, 6])];
        let mut reader = MergeReader::new(runs, desc, 0);
        assert_eq!(drain_all(&mut reader, 2, &budget), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn merge_with_offset_skips_leading_rows() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let budget = test_budget();
        let runs = vec![run_of(vec![1, 3, 5]), run_of(vec![2, 4, 6])];
        let mut reader = MergeReader::new(runs, desc, 3);
        assert_eq!(drain_all(&mut reader, 10, &budget), vec![4, 5, 6]);
    }

    #[test]
    fn empty_run_set_is_immediately_exhausted() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let budget = test_budget();
        let mut reader = MergeReader::new(vec![], desc, 0);
        assert_eq!(reader.emit_batch(10, &budget).unwrap(), None);
    }

    #[test]
    fn merge_output_is_charged_against_the_budget_while_held() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let budget = test_budget();
        let runs = vec![run_of(vec![1, 3, 5]), run_of(vec![2, 4, 6])];
        let mut reader = MergeReader::new(runs, desc, 0);
        assert_eq!(budget.used_bytes(), 0);
        let block = reader.emit_batch(6, &budget).unwrap().unwrap();
        assert_eq!(block.num_rows(), 6);
        assert!(budget.used_bytes() > 0, "output block bytes should be charged while the reader holds them");
    }

    #[test]
    fn rewind_replays_the_same_output_from_the_start() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let budget = test_budget();
        let runs = vec![run_of(vec![1, 3, 5]), run_of(vec![2, 4, 6])];
        let mut reader = MergeReader::new(runs, desc, 1);
        let first = drain_all(&mut reader, 2, &budget);
        reader.rewind();
        let second = drain_all(&mut reader, 2, &budget);
        assert_eq!(first, second);
        assert_eq!(first, vec![2, 3, 4, 5, 6]);
    }
}
