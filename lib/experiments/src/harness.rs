//! Strategy x feature-set sweep
//!
//! Every row of the table is turned into a query and ranked against the whole
//! table (itself included). The row's score is the mean similarity of what
//! came back; a combination's aggregate is the mean over rows that scored.

use crate::config::ExperimentConfig;
use crate::leaderboard::Leaderboard;
use comparables_core::{Listing, ListingTable, Query, Result};
use comparables_similarity::{mean_score, FeatureSet, Ranker, Strategy};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Result of evaluating one row as a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum RowOutcome {
    /// Mean similarity score of the returned results
    Scored(f64),
    /// The ranking call failed or returned nothing scoreable
    Absent(String),
}

impl RowOutcome {
    pub fn score(&self) -> Option<f64> {
        match self {
            RowOutcome::Scored(s) => Some(*s),
            RowOutcome::Absent(_) => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, RowOutcome::Scored(_))
    }
}

/// Outcomes of one (strategy, feature set) combination, in table order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationReport {
    pub strategy: Strategy,
    pub feature_set: String,
    pub outcomes: Vec<RowOutcome>,
    pub aggregate: Option<f64>,
}

impl CombinationReport {
    pub fn new(strategy: Strategy, feature_set: impl Into<String>, outcomes: Vec<RowOutcome>) -> Self {
        let aggregate = aggregate(&outcomes);
        Self {
            strategy,
            feature_set: feature_set.into(),
            outcomes,
            aggregate,
        }
    }

    pub fn scored_rows(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_scored()).count()
    }

    pub fn absent_rows(&self) -> usize {
        self.outcomes.len() - self.scored_rows()
    }
}

/// Mean over scored rows; absent rows are left out, not counted as zero
pub fn aggregate(outcomes: &[RowOutcome]) -> Option<f64> {
    let (sum, count) = outcomes
        .iter()
        .filter_map(RowOutcome::score)
        .filter(|s| !s.is_nan())
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Everything one sweep produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// In sweep order: strategies outer, feature sets inner
    pub combinations: Vec<CombinationReport>,
    pub leaderboard: Leaderboard,
}

/// Runs the sweep over a read-only table
pub struct ExperimentRunner<'a> {
    table: &'a ListingTable,
    config: ExperimentConfig,
}

impl<'a> ExperimentRunner<'a> {
    pub fn new(table: &'a ListingTable, config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { table, config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn run(&self) -> ExperimentReport {
        let mut combinations = Vec::with_capacity(self.config.combinations());
        for &strategy in &self.config.strategies {
            for feature_set in &self.config.feature_sets {
                combinations.push(self.evaluate(strategy, feature_set));
            }
        }
        let leaderboard = Leaderboard::from_reports(&combinations);
        ExperimentReport {
            combinations,
            leaderboard,
        }
    }

    /// Score every row of the table as a query for one combination
    pub fn evaluate(&self, strategy: Strategy, feature_set: &FeatureSet) -> CombinationReport {
        info!(
            strategy = strategy.name(),
            feature_set = %feature_set.name,
            rows = self.table.len(),
            "evaluating combination"
        );
        let start = Instant::now();
        let ranker = Ranker::new(strategy);
        let limit = self.config.limit;
        let features = &feature_set.features;

        let outcomes: Vec<RowOutcome> = if self.config.parallel {
            self.table
                .rows()
                .par_iter()
                .map(|listing| evaluate_row(&ranker, self.table, listing, features, limit))
                .collect()
        } else {
            self.table
                .iter()
                .map(|listing| evaluate_row(&ranker, self.table, listing, features, limit))
                .collect()
        };

        let report = CombinationReport::new(strategy, feature_set.name.clone(), outcomes);
        debug!(
            strategy = strategy.name(),
            feature_set = %feature_set.name,
            aggregate = ?report.aggregate,
            absent = report.absent_rows(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "combination done"
        );
        report
    }
}

/// Rank the table against `listing`'s own values
pub fn evaluate_row(
    ranker: &Ranker,
    table: &ListingTable,
    listing: &Listing,
    features: &[String],
    limit: usize,
) -> RowOutcome {
    let query = Query::from_listing(listing, features);
    match ranker.rank(table, &query, limit) {
        Ok(results) => match mean_score(&results) {
            Some(score) => RowOutcome::Scored(score),
            None => RowOutcome::Absent("no results".to_string()),
        },
        Err(e) => RowOutcome::Absent(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comparables_core::TableConfig;
    use comparables_similarity::FeatureSetRegistry;
    use serde_json::json;

    fn table() -> ListingTable {
        let mut listings = Vec::new();
        for (i, (nbhd, kind, price)) in [
            ("A", "house", 100.0),
            ("A", "house", 200.0),
            ("A", "condo", 150.0),
            ("B", "house", 120.0),
            ("B", "house", 300.0),
            ("B", "house", 180.0),
        ]
        .into_iter()
        .enumerate()
        {
            listings.push(Listing::from_json(
                i as u64 + 1,
                json!({
                    "neighborhood": nbhd,
                    "property_type": kind,
                    "price": price,
                    "num_bedrooms": (i % 3 + 1) as f64,
                    "latitude": 19.40 + i as f64 * 0.01,
                    "longitude": -99.10
                }),
            ));
        }
        ListingTable::from_listings(TableConfig::default(), listings)
    }

    fn registry() -> FeatureSetRegistry {
        FeatureSetRegistry::new(vec![
            FeatureSet::new("price", &["price"]),
            FeatureSet::new("price_rooms", &["price", "num_bedrooms"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_aggregate_ignores_absent_rows() {
        let outcomes = vec![
            RowOutcome::Scored(0.2),
            RowOutcome::Absent("boom".into()),
            RowOutcome::Scored(0.4),
        ];
        assert!((aggregate(&outcomes).unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(aggregate(&[RowOutcome::Absent("x".into())]), None);
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn test_run_covers_every_combination() {
        let table = table();
        let config = ExperimentConfig::default().with_feature_sets(registry());
        let report = ExperimentRunner::new(&table, config).unwrap().run();

        assert_eq!(report.combinations.len(), 8);
        assert_eq!(report.leaderboard.len(), 8);
        for combination in &report.combinations {
            assert_eq!(combination.outcomes.len(), table.len());
        }
        let scores: Vec<f64> = report
            .leaderboard
            .iter()
            .filter_map(|e| e.aggregate_score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_failing_rows_are_absent() {
        let mut table = table();
        // No price: every query built from this row lacks the feature, and the
        // row never enters a candidate pool
        table.push(Listing::from_json(
            7u64,
            json!({"neighborhood": "C", "property_type": "loft"}),
        ));
        let config = ExperimentConfig::default()
            .with_strategies(vec![Strategy::CombinedGeo])
            .with_feature_sets(registry());
        let runner = ExperimentRunner::new(&table, config).unwrap();
        let sets = registry();
        let report = runner.evaluate(Strategy::CombinedGeo, sets.resolve("price").unwrap());

        // Row 7 has no coordinates to impute from its neighborhood
        assert!(!report.outcomes[6].is_scored());
        assert_eq!(report.absent_rows(), 1);
        assert_eq!(report.scored_rows(), 6);
        assert_eq!(report.aggregate, aggregate(&report.outcomes[..6]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table = table();
        let parallel = ExperimentRunner::new(
            &table,
            ExperimentConfig::default().with_feature_sets(registry()),
        )
        .unwrap()
        .run();
        let sequential = ExperimentRunner::new(
            &table,
            ExperimentConfig::default()
                .with_feature_sets(registry())
                .with_parallel(false),
        )
        .unwrap()
        .run();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_row_scores_itself() {
        let table = table();
        let ranker = Ranker::new(Strategy::EuclideanMinMax);
        let features = vec!["price".to_string()];
        let listing = &table.rows()[0];
        // Limit 1 returns the row itself at distance 0
        assert_eq!(
            evaluate_row(&ranker, &table, listing, &features, 1),
            RowOutcome::Scored(0.0)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let table = table();
        assert!(ExperimentRunner::new(&table, ExperimentConfig::default().with_limit(0)).is_err());
    }
}
