//! Error taxonomy for the sort operator (spec §7).
//!
//! Policy: no local recovery. Every variant surfaces to the caller verbatim;
//! `SortOperator::close` still runs on every exit path regardless of which
//! variant was returned.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SortError>;

#[derive(Debug, Error)]
pub enum SortError {
    /// Propagated verbatim from the upstream producer.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Observed at a cancellation checkpoint (once per extracted run during
    /// build; once per `emit_batch` during drain).
    #[error("operation cancelled")]
    Cancelled,

    /// Failure inside a sort-key projection expression.
    #[error("expression evaluation error: {0}")]
    Expression(String),

    /// A legacy row-batch-style call against an operator that only exposes
    /// the block-oriented `next`.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// Invariant violation (e.g. an empty run reaching the merge heap).
    /// Should never occur; escalates as a bug if it does.
    #[error("internal invariant violation: {0}")]
    Internal(String),
}
