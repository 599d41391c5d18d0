//! Sort key descriptors and the single comparator shared by every component
//! that needs to order rows (partial sort, pruning heap, merge heap).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// A signed ordering direction, isomorphic to the spec's `{+1,-1}` encoding
/// but unrepresentable-illegal-value-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Applies this direction's sign to a native (ascending) comparison.
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }

    fn flip(self) -> Direction {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

/// One column's ordering: `(column_index, direction, nulls_direction)`.
///
/// `nulls_direction` follows the spec convention: nulls-first is the opposite
/// sign of `direction`, nulls-last is the same sign. Use the constructors
/// below rather than hand-assembling the triple to keep that convention in
/// one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column_index: usize,
    pub direction: Direction,
    pub nulls_direction: Direction,
}

impl SortKey {
    pub fn new(column_index: usize, ascending: bool, nulls_first: bool) -> Self {
        let direction = if ascending {
            Direction::Ascending
        } else {
            Direction::Descending
        };
        let nulls_direction = if nulls_first {
            direction.flip()
        } else {
            direction
        };
        Self {
            column_index,
            direction,
            nulls_direction,
        }
    }
}

/// Ordered list of `SortKey`; list order is major-to-minor precedence.
pub type SortDescription = Vec<SortKey>;

/// Compare row `a_row` of `a` against row `b_row` of `b` under `desc`.
///
/// This is the single comparator shared by `PartialSorter`, the RunSet
/// pruning heap, and the MergeReader merge heap — the spec's "null ordering
/// is consistent across partial sort, pruning comparator, and merge
/// comparator" invariant is a structural guarantee of calling this function
/// everywhere, not three independently-maintained implementations.
pub fn compare_row(desc: &SortDescription, a: &Block, a_row: usize, b: &Block, b_row: usize) -> Ordering {
    for key in desc {
        let av = a.value(key.column_index, a_row);
        let bv = b.value(key.column_index, b_row);

        let ord = match (av.is_null(), bv.is_null()) {
            (false, false) => key.direction.apply(av.native_compare(bv)),
            (true, false) => sign_ordering(key.nulls_direction),
            (false, true) => sign_ordering(key.nulls_direction).reverse(),
            (true, true) => Ordering::Equal,
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// A null compares as "less" when its direction is ascending, "greater" when
/// descending — this is what gives `nulls_direction` its sign semantics.
fn sign_ordering(direction: Direction) -> Ordering {
    match direction {
        Direction::Ascending => Ordering::Less,
        Direction::Descending => Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, ColumnData};
    use crate::types::Scalar;

    fn block_of(values: Vec<Scalar>) -> Block {
        Block::from_columns(vec![ColumnData {
            name: "c0".into(),
            values,
        }])
        .unwrap()
    }

    #[test]
    fn ascending_nulls_last() {
        let key = SortKey::new(0, true, false);
        let desc = vec![key];
        let a = block_of(vec![Scalar::I64(1), Scalar::Null]);
        assert_eq!(compare_row(&desc, &a, 0, &a, 1), Ordering::Less);
        assert_eq!(compare_row(&desc, &a, 1, &a, 0), Ordering::Greater);
    }

    #[test]
    fn descending_nulls_first() {
        let key = SortKey::new(0, false, true);
        let desc = vec![key];
        let a = block_of(vec![Scalar::Null, Scalar::I64(1)]);
        // null should compare less (sorts first) even though direction is desc
        assert_eq!(compare_row(&desc, &a, 0, &a, 1), Ordering::Less);
    }

    #[test]
    fn both_null_falls_through() {
        let desc = vec![
            SortKey::new(0, true, false),
            SortKey::new(1, true, false),
        ];
        let a = Block::from_columns(vec![
            ColumnData {
                name: "c0".into(),
                values: vec![Scalar::Null, Scalar::Null],
            },
            ColumnData {
                name: "c1".into(),
                values: vec![Scalar::I64(5), Scalar::I64(3)],
            },
        ])
        .unwrap();
        assert_eq!(compare_row(&desc, &a, 0, &a, 1), Ordering::Greater);
    }
}
