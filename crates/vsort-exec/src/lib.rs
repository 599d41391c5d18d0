#![forbid(unsafe_code)]
//! vsort-exec: runtime-state and upstream test-harness implementations for
//! driving a `vsort_operators::sort::SortOperator` end to end, plus the
//! environment-overridable configuration the demo binary reads.

pub mod config;
pub mod metrics;
pub mod state;
pub mod upstream;

pub use config::ExecConfig;
pub use state::DefaultRuntimeState;
pub use upstream::VecUpstream;
