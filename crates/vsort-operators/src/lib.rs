#![forbid(unsafe_code)]
//! vsort-operators: the vectorized sort operator.
//!
//! Buffers upstream blocks into sorted runs (`sort::run_buffer`,
//! `sort::partial_sort`), optionally prunes entire runs under a Top-N bound
//! (`sort::run_set`), and drains the admitted runs in final order
//! (`sort::merge_reader`) through a small state machine (`sort::operator`).

pub mod sort;
