//! Convenient re-exports for downstream crates.

pub use crate::block::{Block, BlockBuilder, ColumnData};
pub use crate::error::{Error, Result};
pub use crate::id::{OpId, RunId};
pub use crate::schema::{DataType, Field, Schema};
pub use crate::sort_key::{compare_row, Direction, SortDescription, SortKey};
pub use crate::types::Scalar;
