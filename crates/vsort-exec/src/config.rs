//! Environment-overridable configuration for running a `SortOperator` inside
//! the demo binary or a host engine's test harness.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Hard memory cap passed to the budget implementation.
    pub mem_cap_bytes: usize,
    /// Rows requested per `SortOperator::next` call.
    pub batch_size: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            mem_cap_bytes: 512 * 1024 * 1024,
            batch_size: 8192,
        }
    }
}

impl ExecConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("VSORT_MEM_CAP_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.mem_cap_bytes = v;
            }
        }

        if let Ok(s) = std::env::var("VSORT_BATCH_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.batch_size = v;
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_sane_values() {
        let cfg = ExecConfig::default();
        assert!(cfg.mem_cap_bytes > 0);
        assert!(cfg.batch_size > 0);
    }
}
