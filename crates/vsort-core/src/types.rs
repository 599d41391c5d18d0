//! Lightweight logical value placeholder, mirroring the production engine's
//! scalar type without pulling a full columnar array library into this core.
//!
//! Downstream crates that sit above the operator core may convert these to
//! Arrow-style arrays; this crate stays minimal and allocation-honest.

use serde::{Deserialize, Serialize};

use crate::schema::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
}

impl Scalar {
    pub fn data_type(&self) -> DataType {
        match self {
            Scalar::Null => DataType::Utf8,
            Scalar::Bool(_) => DataType::Boolean,
            Scalar::I32(_) => DataType::Int32,
            Scalar::I64(_) => DataType::Int64,
            Scalar::F32(_) => DataType::Float32,
            Scalar::F64(_) => DataType::Float64,
            Scalar::Str(_) => DataType::Utf8,
            Scalar::Bin(_) => DataType::Binary,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Conservative per-value byte estimate used by `RunBuffer::byte_size`.
    pub fn approx_bytes(&self) -> usize {
        match self {
            Scalar::Null => 0,
            Scalar::Bool(_) => 1,
            Scalar::I32(_) => 4,
            Scalar::I64(_) => 8,
            Scalar::F32(_) => 4,
            Scalar::F64(_) => 8,
            Scalar::Str(s) => s.len(),
            Scalar::Bin(b) => b.len(),
        }
    }

    /// Native (type-only) comparison, ignoring nulls and sort direction.
    /// Mixed-type pairs compare by a stable variant order; NaN sorts greater
    /// than any other float (consistent total order required by `sort_unstable_by`).
    pub fn native_compare(&self, other: &Scalar) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use Scalar::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (I32(a), I32(b)) => a.cmp(b),
            (I64(a), I64(b)) => a.cmp(b),
            (F32(a), F32(b)) => cmp_float(*a, *b),
            (F64(a), F64(b)) => cmp_float(*a, *b),
            (Str(a), Str(b)) => a.cmp(b),
            (Bin(a), Bin(b)) => a.cmp(b),
            (Null, Null) => Ordering::Equal,
            _ => variant_order(self).cmp(&variant_order(other)),
        }
    }
}

fn cmp_float<F: PartialOrd + Copy>(a: F, b: F) -> std::cmp::Ordering
where
    f64: From<F>,
{
    let (a, b): (f64, f64) = (a.into(), b.into());
    match a.partial_cmp(&b) {
        Some(o) => o,
        None => {
            // At least one operand is NaN; order NaN as greater than everything.
            match (a.is_nan(), b.is_nan()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                (false, false) => std::cmp::Ordering::Equal,
            }
        }
    }
}

fn variant_order(s: &Scalar) -> u8 {
    use Scalar::*;
    match s {
        Null => 0,
        Bool(_) => 1,
        I32(_) => 2,
        I64(_) => 3,
        F32(_) => 4,
        F64(_) => 5,
        Str(_) => 6,
        Bin(_) => 7,
    }
}
