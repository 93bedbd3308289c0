//! Model configuration.

use serde::{Deserialize, Serialize};

/// Options controlling how a chip tree is evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Add each chip's amortized NRE into its self cost (and therefore into
    /// every ancestor's cost). When false, NRE is reported separately by
    /// `Chip::nre_cost` and folded in only by `Chip::total_cost`.
    pub include_nre_in_self_cost: bool,
    /// Seed for the test cost derating draws. None = seeded from entropy.
    pub seed: Option<u64>,
    /// Minimum number of trees for `evaluate_all` to run in parallel.
    pub min_trees_for_parallel: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            include_nre_in_self_cost: false,
            seed: None,
            min_trees_for_parallel: 2,
        }
    }
}

impl ModelConfig {
    /// Fold amortized NRE into self cost.
    pub fn with_nre_in_self_cost(mut self, include: bool) -> Self {
        self.include_nre_in_self_cost = include;
        self
    }

    /// Make derating draws reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the minimum tree count for parallel evaluation.
    pub fn with_min_parallel(mut self, min: usize) -> Self {
        self.min_trees_for_parallel = min;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ModelConfig::default().with_seed(9).with_nre_in_self_cost(true);
        assert_eq!(config.seed, Some(9));
        assert!(config.include_nre_in_self_cost);
        assert_eq!(config.min_trees_for_parallel, 2);
    }

    #[test]
    fn test_from_json_defaults() {
        let config: ModelConfig = serde_json::from_str(r#"{"seed": 3}"#).unwrap();
        assert_eq!(config.seed, Some(3));
        assert!(!config.include_nre_in_self_cost);
    }
}
