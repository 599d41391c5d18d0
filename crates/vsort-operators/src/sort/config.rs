//! Recognized configuration options (spec §6).

use vsort_core::sort_key::{SortDescription, SortKey};

/// Sort operator configuration.
///
/// `limit = None` corresponds to the spec's `limit = -1`: it disables both
/// the Top-N pruning path in `RunSet` and the final truncation path in the
/// operator.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub offset: usize,
    pub limit: Option<usize>,
    pub is_asc_order: Vec<bool>,
    pub nulls_first: Vec<bool>,
    pub run_row_threshold: usize,
    pub run_byte_threshold: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: None,
            is_asc_order: Vec::new(),
            nulls_first: Vec::new(),
            run_row_threshold: 1024 * 1024,
            run_byte_threshold: 64 * 1024 * 1024,
        }
    }
}

impl SortConfig {
    /// True when this config operates in Top-N mode (bounded `offset+limit`).
    pub fn is_top_n(&self) -> bool {
        self.limit.is_some()
    }

    /// `offset + limit`, only meaningful (and only ever constructed) in
    /// Top-N mode.
    pub fn limit_hint(&self) -> Option<usize> {
        self.limit.map(|l| self.offset + l)
    }

    /// Build a `SortDescription` pairing each materialized sort-key column
    /// index with this config's direction/nulls arrays, in the order given.
    pub fn sort_description(&self, column_indices: &[usize]) -> SortDescription {
        column_indices
            .iter()
            .enumerate()
            .map(|(i, &col)| {
                let ascending = self.is_asc_order.get(i).copied().unwrap_or(true);
                let nulls_first = self.nulls_first.get(i).copied().unwrap_or(false);
                SortKey::new(col, ascending, nulls_first)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_hint_only_in_top_n_mode() {
        let mut cfg = SortConfig::default();
        assert_eq!(cfg.limit_hint(), None);
        cfg.offset = 2;
        cfg.limit = Some(3);
        assert_eq!(cfg.limit_hint(), Some(5));
    }

    #[test]
    fn sort_description_defaults_asc_nulls_last() {
        let cfg = SortConfig::default();
        let desc = cfg.sort_description(&[0, 1]);
        assert_eq!(desc.len(), 2);
        assert_eq!(desc[0].column_index, 0);
        assert_eq!(desc[1].column_index, 1);
    }
}
