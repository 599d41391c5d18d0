//! `Run` and `BlockCursor`: a materialized, already-sorted run of rows and a
//! movable position into it.

use std::cmp::Ordering;
use std::sync::Arc;

use vsort_core::block::Block;
use vsort_core::budget::BudgetGuard;
use vsort_core::sort_key::{compare_row, SortDescription};

/// One fully-sorted, in-memory run produced by `PartialSorter`.
///
/// Carries the memory-budget guard transferred from the `RunBuffer` that
/// accumulated its rows (if any), so the run's bytes stay charged against the
/// budget for as long as the run lives in a `RunSet`/`MergeReader`, not just
/// while it was being buffered.
pub struct Run {
    pub block: Block,
    guard: Option<Box<dyn BudgetGuard>>,
}

impl Run {
    pub fn new(block: Block) -> Self {
        Self { block, guard: None }
    }

    /// Construct a run that owns `guard` for its lifetime.
    pub fn with_guard(block: Block, guard: Option<Box<dyn BudgetGuard>>) -> Self {
        Self { block, guard }
    }

    pub fn num_rows(&self) -> usize {
        self.block.num_rows()
    }

    pub fn guard_bytes(&self) -> usize {
        self.guard.as_ref().map(|g| g.bytes()).unwrap_or(0)
    }
}

/// A position into a `Run`, advanced row-by-row by the merge/pruning logic.
///
/// Cheap to clone: `Arc<Run>` is shared, not duplicated.
#[derive(Clone)]
pub struct BlockCursor {
    run: Arc<Run>,
    pos: usize,
    description: Arc<SortDescription>,
}

impl BlockCursor {
    pub fn new(run: Arc<Run>, description: Arc<SortDescription>) -> Self {
        Self {
            run,
            pos: 0,
            description,
        }
    }

    pub fn run(&self) -> &Arc<Run> {
        &self.run
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_last(&self) -> bool {
        self.pos + 1 >= self.run.num_rows()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.run.num_rows()
    }

    /// Advance one row. Never advances past the end; the caller is expected
    /// to check `is_exhausted` before calling `current_*` again.
    pub fn next(&mut self) {
        self.pos += 1;
    }

    /// Compare this cursor's current row against `other`'s current row.
    pub fn current_less(&self, other: &BlockCursor) -> bool {
        compare_row(
            &self.description,
            &self.run.block,
            self.pos,
            &other.run.block,
            other.pos,
        ) == Ordering::Less
    }

    /// True if this cursor's current row is `>=` every row remaining in
    /// `other` from `other`'s current position onward — used by the pruning
    /// heap's dominance check (a candidate run that can never beat the
    /// worst-admitted row is discarded without materializing it).
    pub fn current_greater_or_equal_all(&self, other: &BlockCursor) -> bool {
        compare_row(
            &self.description,
            &self.run.block,
            self.pos,
            &other.run.block,
            other.pos,
        ) != Ordering::Less
    }
}

impl PartialEq for BlockCursor {
    fn eq(&self, other: &Self) -> bool {
        compare_row(
            &self.description,
            &self.run.block,
            self.pos,
            &other.run.block,
            other.pos,
        ) == Ordering::Equal
    }
}
impl Eq for BlockCursor {}

impl PartialOrd for BlockCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BlockCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_row(
            &self.description,
            &self.run.block,
            self.pos,
            &other.run.block,
            other.pos,
        )
    }
}

/// `BlockCursor` ordered normally — a `BinaryHeap<ForwardCursor>` naturally
/// pops the *greatest* current row first, which is exactly the dominance
/// probe the pruning heap needs (worst-admitted row on top).
#[derive(Clone)]
pub struct ForwardCursor(pub BlockCursor);

impl PartialEq for ForwardCursor {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for ForwardCursor {}
impl PartialOrd for ForwardCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ForwardCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// `BlockCursor` ordered in reverse — a `BinaryHeap<ReverseCursor>` pops the
/// *smallest* current row first, which is what the k-way merge heap needs.
#[derive(Clone)]
pub struct ReverseCursor(pub BlockCursor);

impl PartialEq for ReverseCursor {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for ReverseCursor {}
impl PartialOrd for ReverseCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ReverseCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsort_core::block::ColumnData;
    use vsort_core::sort_key::SortKey;
    use vsort_core::types::Scalar;

    fn run_of(values: Vec<Scalar>) -> Arc<Run> {
        let block = Block::from_columns(vec![ColumnData {
            name: "c0".into(),
            values,
        }])
        .unwrap();
        Arc::new(Run::new(block))
    }

    #[test]
    fn cursor_advances_and_detects_last() {
        let run = run_of(vec![Scalar::I64(1), Scalar::I64(2)]);
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let mut cursor = BlockCursor::new(run, desc);
        assert!(!cursor.is_last());
        cursor.next();
        assert!(cursor.is_last());
        cursor.next();
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn reverse_cursor_inverts_heap_order() {
        let desc = Arc::new(vec![SortKey::new(0, true, false)]);
        let small = BlockCursor::new(run_of(vec![Scalar::I64(1)]), desc.clone());
        let big = BlockCursor::new(run_of(vec![Scalar::I64(9)]), desc);

        let mut heap = std::collections::BinaryHeap::new();
        heap.push(ReverseCursor(small.clone()));
        heap.push(ReverseCursor(big.clone()));
        // min-heap behavior: smallest current row pops first
        assert!(heap.pop().unwrap().0.current_less(&big));
    }
}
