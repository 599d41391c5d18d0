use thiserror::Error;

/// Canonical result for `vsort-core`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("internal invariant failed: {0}")]
    Invariant(String),
}
