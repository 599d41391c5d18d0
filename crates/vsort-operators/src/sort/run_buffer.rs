//! Accumulates upstream blocks until a row or byte threshold is crossed, at
//! which point the buffered rows are handed to `PartialSorter` and the
//! resulting sorted run is extracted.

use vsort_core::block::{Block, BlockBuilder};
use vsort_core::budget::{MemoryBudget, ResizableGuard};

use super::error::{Result, SortError};

/// Buffers rows column-wise and tracks a live byte estimate against a
/// configured memory guard, growing the guard as rows accumulate.
pub struct RunBuffer<G: ResizableGuard> {
    column_names: Vec<String>,
    builder: BlockBuilder,
    row_count: usize,
    byte_size: usize,
    row_threshold: usize,
    byte_threshold: usize,
    guard: Option<G>,
}

impl<G: ResizableGuard> RunBuffer<G> {
    pub fn new(column_names: Vec<String>, row_threshold: usize, byte_threshold: usize) -> Self {
        let builder = BlockBuilder::new(column_names.clone());
        Self {
            column_names,
            builder,
            row_count: 0,
            byte_size: 0,
            row_threshold,
            byte_threshold,
            guard: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Append every row of `block`, growing the memory guard as needed.
    /// Returns `true` if either threshold is now crossed and the caller
    /// should flush.
    pub fn append<M>(&mut self, block: &Block, budget: &M) -> Result<bool>
    where
        M: MemoryBudget<Guard = G>,
    {
        for row in 0..block.num_rows() {
            self.builder.push_row_from(block, row);
            self.row_count += 1;
            for col in 0..block.num_columns() {
                self.byte_size += block.value(col, row).approx_bytes();
            }
        }
        self.resize_guard(budget)?;
        Ok(self.row_count >= self.row_threshold || self.byte_size >= self.byte_threshold)
    }

    fn resize_guard<M>(&mut self, budget: &M) -> Result<()>
    where
        M: MemoryBudget<Guard = G>,
    {
        match &mut self.guard {
            Some(guard) if guard.try_resize(self.byte_size) => Ok(()),
            _ => match budget.try_acquire(self.byte_size, "run_buffer") {
                Some(guard) => {
                    self.guard = Some(guard);
                    Ok(())
                }
                None => Err(SortError::Internal(format!(
                    "memory budget exceeded while buffering run: {} bytes requested",
                    self.byte_size
                ))),
            },
        }
    }

    /// Take the accumulated rows as a fresh, un-sorted block and reset this
    /// buffer for the next run. The memory guard that was backing the
    /// accumulation is handed back to the caller rather than dropped here —
    /// the bytes it accounts for don't stop existing once sorted into a
    /// `Run`, so the caller (the operator) transfers it onto that `Run`
    /// instead of releasing it early.
    pub fn extract(&mut self) -> Result<(Block, Option<G>)> {
        let builder = std::mem::replace(&mut self.builder, BlockBuilder::new(self.column_names.clone()));
        self.row_count = 0;
        self.byte_size = 0;
        let guard = self.guard.take();
        let block = builder.finish().map_err(|e| SortError::Internal(e.to_string()))?;
        Ok((block, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsort_core::block::ColumnData;
    use vsort_core::types::Scalar;
    use vsort_mem::MemoryBudgetImpl;

    fn block_of(values: Vec<Scalar>) -> Block {
        Block::from_columns(vec![ColumnData {
            name: "c0".into(),
            values,
        }])
        .unwrap()
    }

    #[test]
    fn append_crosses_row_threshold() {
        let budget = MemoryBudgetImpl::new(1024 * 1024);
        let mut buf = RunBuffer::new(vec!["c0".into()], 2, 1024 * 1024);
        let crossed = buf.append(&block_of(vec![Scalar::I64(1)]), &budget).unwrap();
        assert!(!crossed);
        let crossed = buf.append(&block_of(vec![Scalar::I64(2)]), &budget).unwrap();
        assert!(crossed);
        assert_eq!(buf.row_count(), 2);
    }

    #[test]
    fn extract_resets_buffer() {
        let budget = MemoryBudgetImpl::new(1024 * 1024);
        let mut buf = RunBuffer::new(vec!["c0".into()], 10, 1024 * 1024);
        buf.append(&block_of(vec![Scalar::I64(1), Scalar::I64(2)]), &budget)
            .unwrap();
        let (block, guard) = buf.extract().unwrap();
        assert_eq!(block.num_rows(), 2);
        assert_eq!(buf.row_count(), 0);
        assert_eq!(buf.byte_size(), 0);
        assert!(guard.is_some(), "the accumulation guard transfers out, it isn't dropped");
    }
}
