use comparables_core::{Error, Result};
use comparables_similarity::{FeatureSetRegistry, Strategy, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What an experiment sweeps and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Results requested from every ranking call
    pub limit: usize,
    /// Evaluate the rows of one combination on the rayon pool
    pub parallel: bool,
    pub strategies: Vec<Strategy>,
    pub feature_sets: FeatureSetRegistry,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            parallel: true,
            strategies: Strategy::ALL.to_vec(),
            feature_sets: FeatureSetRegistry::builtin(),
        }
    }
}

impl ExperimentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    #[must_use]
    pub fn with_feature_sets(mut self, feature_sets: FeatureSetRegistry) -> Self {
        self.feature_sets = feature_sets;
        self
    }

    /// Number of (strategy, feature set) combinations
    pub fn combinations(&self) -> usize {
        self.strategies.len() * self.feature_sets.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::InvalidLimit(self.limit));
        }
        if self.strategies.is_empty() {
            return Err(Error::InvalidConfig("no strategies selected".to_string()));
        }
        self.feature_sets
            .validate()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}
