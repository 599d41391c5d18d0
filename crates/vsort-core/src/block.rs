//! Column-major row batch ("Block") with zero-copy slicing and sharing.
//!
//! A `Block` never deep-copies its backing storage on `clone`, `slice`, or
//! construction from an existing block: each column is held behind an `Arc`,
//! and a block is just that vector of `Arc`s plus a `(offset, len)` window
//! into them. Only code that actually needs new values (`BlockBuilder`,
//! `PartialSorter`'s permutation gather) allocates fresh `Vec<Scalar>`s.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Scalar;

#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnData {
    pub name: String,
    pub values: Vec<Scalar>,
}

/// Column-major batch of rows. Cheap to clone (`Arc` bump per column).
#[derive(Clone)]
pub struct Block {
    columns: Vec<Arc<ColumnData>>,
    offset: usize,
    len: usize,
}

impl Block {
    /// Build a block owning fresh column storage. All columns must agree on
    /// row count.
    pub fn from_columns(columns: Vec<ColumnData>) -> Result<Self> {
        let len = columns.first().map(|c| c.values.len()).unwrap_or(0);
        for c in &columns {
            if c.values.len() != len {
                return Err(Error::Schema(format!(
                    "column '{}' has {} rows, expected {}",
                    c.name,
                    c.values.len(),
                    len
                )));
            }
        }
        Ok(Self {
            columns: columns.into_iter().map(Arc::new).collect(),
            offset: 0,
            len,
        })
    }

    pub fn empty(column_names: Vec<String>) -> Self {
        let columns = column_names
            .into_iter()
            .map(|name| {
                Arc::new(ColumnData {
                    name,
                    values: Vec::new(),
                })
            })
            .collect();
        Self {
            columns,
            offset: 0,
            len: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_name(&self, idx: usize) -> &str {
        &self.columns[idx].name
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Value at `(col, row)`, `row` relative to this block's own window.
    pub fn value(&self, col: usize, row: usize) -> &Scalar {
        &self.columns[col].values[self.offset + row]
    }

    /// The full row slice for a column, windowed by this block's offset/len.
    pub fn column_values(&self, col: usize) -> &[Scalar] {
        &self.columns[col].values[self.offset..self.offset + self.len]
    }

    /// Zero-copy row slice: shares the same backing `Arc<ColumnData>`s.
    pub fn slice(&self, offset: usize, len: usize) -> Block {
        assert!(
            offset + len <= self.len,
            "slice out of range: offset={offset} len={len} block_len={}",
            self.len
        );
        Block {
            columns: self.columns.clone(),
            offset: self.offset + offset,
            len,
        }
    }

    /// Conservative total byte estimate across every column in this block's
    /// window, summing the same per-`Scalar` cost model `RunBuffer` uses.
    pub fn approx_bytes(&self) -> usize {
        (0..self.num_columns())
            .map(|col| self.column_values(col).iter().map(|v| v.approx_bytes()).sum::<usize>())
            .sum()
    }
}

/// Owned, mutable column builder used by `RunBuffer` (accumulation) and by
/// any component that needs to materialize new rows (`MergeReader`'s output,
/// `PartialSorter`'s permutation gather).
pub struct BlockBuilder {
    columns: Vec<ColumnData>,
}

impl BlockBuilder {
    pub fn new(column_names: Vec<String>) -> Self {
        Self {
            columns: column_names
                .into_iter()
                .map(|name| ColumnData {
                    name,
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn with_capacity(column_names: Vec<String>, rows: usize) -> Self {
        Self {
            columns: column_names
                .into_iter()
                .map(|name| ColumnData {
                    name,
                    values: Vec::with_capacity(rows),
                })
                .collect(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    /// Append every column value of `row` from `src` to the matching column
    /// here, by position.
    pub fn push_row_from(&mut self, src: &Block, row: usize) {
        for (col_idx, col) in self.columns.iter_mut().enumerate() {
            col.values.push(src.value(col_idx, row).clone());
        }
    }

    /// Column-wise append of an entire block's rows.
    pub fn append_block(&mut self, src: &Block) {
        for row in 0..src.num_rows() {
            self.push_row_from(src, row);
        }
    }

    pub fn finish(self) -> Result<Block> {
        Block::from_columns(self.columns)
    }
}
