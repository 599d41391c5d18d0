//! Collaborator traits the sort operator depends on but does not implement
//! (spec §6). Concrete implementations live with the caller — `vsort-exec`
//! provides test-harness and demo-binary instances.

use std::sync::Arc;

use vsort_core::block::Block;
use vsort_core::schema::Schema;

use super::error::Result;

/// The operator's single child producer.
pub trait Upstream {
    /// Pull the next block. The returned `bool` is the end-of-stream flag;
    /// when `true` the accompanying block may be empty and must still be
    /// consumed (it is the last block, not a sentinel after the last one).
    fn next(&mut self) -> Result<(Block, bool)>;

    fn row_descriptor(&self) -> &Schema;
}

/// A single projection used to materialize one sort-key column from a block.
pub trait SortKeyExpr: Send + Sync {
    /// Evaluate against `block`, returning the index of the result column
    /// (appended to the block by the caller, or already present).
    fn evaluate(&self, block: &Block) -> Result<usize>;
}

/// Binds a set of `SortKeyExpr`s to the operator's configured sort keys.
pub trait SortKeyExprCtx: Send + Sync {
    /// When `false`, the configured sort-key column indices already refer to
    /// materialized columns and no expression evaluation is needed.
    fn need_materialize_tuple(&self) -> bool;

    fn lhs_ordering_expr_ctxs(&self) -> &[Arc<dyn SortKeyExpr>];
}

/// Execution-environment facts the operator consults but never owns.
pub trait RuntimeState {
    fn batch_size(&self) -> usize;

    /// Checked once per extracted run during build and once per emitted
    /// batch during drain; any error aborts the operator immediately.
    fn check_query_state(&self) -> Result<()>;

    fn is_cancelled(&self) -> bool;

    fn tracer(&self) -> Option<&Tracer>;
}

/// Opaque handle the operator forwards to span-emitting helpers. Kept
/// intentionally minimal; a real engine's tracer lives behind this.
pub struct Tracer {
    pub name: &'static str,
}
