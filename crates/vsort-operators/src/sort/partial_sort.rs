//! Sorts one accumulated, unsorted block into a `Run`.
//!
//! When a `limit_hint` is known (Top-N mode) only the first `limit_hint` rows
//! need to end up in correct order; the rest just need to be partitioned
//! behind them, so `select_nth_unstable_by` does the partition pass before a
//! final `sort_unstable_by` on the prefix, instead of sorting the whole
//! block.

use std::cmp::Ordering;

use vsort_core::block::{Block, BlockBuilder};
use vsort_core::sort_key::{compare_row, SortDescription};

use super::error::Result;

pub struct PartialSorter;

impl PartialSorter {
    /// Sort `block` under `desc`, returning a new block with rows in sorted
    /// order. `limit_hint`, when present, is `offset + limit`: rows beyond
    /// it need not be in final order, only excluded from the sorted prefix's
    /// correctness.
    pub fn sort(block: &Block, desc: &SortDescription, limit_hint: Option<usize>) -> Result<Block> {
        let n = block.num_rows();
        let mut perm: Vec<u32> = (0..n as u32).collect();

        let cmp = |a: &u32, b: &u32| -> Ordering { compare_row(desc, block, *a as usize, block, *b as usize) };

        match limit_hint {
            Some(k) if k < n => {
                perm.select_nth_unstable_by(k, cmp);
                perm[..k].sort_unstable_by(cmp);
            }
            _ => perm.sort_unstable_by(cmp),
        }

        let mut builder = BlockBuilder::with_capacity(block.column_names(), n);
        for &row in &perm {
            builder.push_row_from(block, row as usize);
        }
        builder.finish().map_err(|e| super::error::SortError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsort_core::block::ColumnData;
    use vsort_core::sort_key::SortKey;
    use vsort_core::types::Scalar;

    fn block_of(values: Vec<i64>) -> Block {
        Block::from_columns(vec![ColumnData {
            name: "c0".into(),
            values: values.into_iter().map(Scalar::I64).collect(),
        }])
        .unwrap()
    }

    fn as_i64(block: &Block) -> Vec<i64> {
        (0..block.num_rows())
            .map(|r| match block.value(0, r) {
                Scalar::I64(v) => *v,
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn sorts_full_block_ascending() {
        let block = block_of(vec![5, 1, 4, 2, 3]);
        let desc = vec![SortKey::new(0, true, false)];
        let sorted = PartialSorter::sort(&block, &desc, None).unwrap();
        assert_eq!(as_i64(&sorted), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn top_n_prefix_is_correctly_ordered() {
        let block = block_of(vec![9, 1, 8, 2, 7, 3]);
        let desc = vec![SortKey::new(0, true, false)];
        let sorted = PartialSorter::sort(&block, &desc, Some(3)).unwrap();
        assert_eq!(&as_i64(&sorted)[..3], &[1, 2, 3]);
    }

    #[test]
    fn descending_order() {
        let block = block_of(vec![1, 2, 3]);
        let desc = vec![SortKey::new(0, false, false)];
        let sorted = PartialSorter::sort(&block, &desc, None).unwrap();
        assert_eq!(as_i64(&sorted), vec![3, 2, 1]);
    }
}
