use crate::harness::CombinationReport;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// One (strategy, feature set) line of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub strategy: String,
    pub feature_set: String,
    /// Mean of the scored rows; `None` when no row produced a score
    pub aggregate_score: Option<f64>,
    pub scored_rows: usize,
    pub absent_rows: usize,
}

impl From<&CombinationReport> for LeaderboardEntry {
    fn from(report: &CombinationReport) -> Self {
        Self {
            strategy: report.strategy.name().to_string(),
            feature_set: report.feature_set.clone(),
            aggregate_score: report.aggregate,
            scored_rows: report.scored_rows(),
            absent_rows: report.absent_rows(),
        }
    }
}

/// Combinations sorted by ascending aggregate score, lower is better.
///
/// Entries without an aggregate come last; ties keep sweep order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by_key(|e| {
            (
                e.aggregate_score.is_none(),
                OrderedFloat(e.aggregate_score.unwrap_or(f64::INFINITY)),
            )
        });
        Self { entries }
    }

    pub fn from_reports(reports: &[CombinationReport]) -> Self {
        Self::new(reports.iter().map(LeaderboardEntry::from).collect())
    }

    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.entries.first().filter(|e| e.aggregate_score.is_some())
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LeaderboardEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Leaderboard {
    type Item = &'a LeaderboardEntry;
    type IntoIter = std::slice::Iter<'a, LeaderboardEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(strategy: &str, feature_set: &str, score: Option<f64>) -> LeaderboardEntry {
        LeaderboardEntry {
            strategy: strategy.to_string(),
            feature_set: feature_set.to_string(),
            aggregate_score: score,
            scored_rows: usize::from(score.is_some()),
            absent_rows: usize::from(score.is_none()),
        }
    }

    #[test]
    fn test_sorted_ascending_with_absent_last() {
        let board = Leaderboard::new(vec![
            entry("hierarchical", "surface", Some(0.4)),
            entry("combined_geo", "surface", None),
            entry("euclidean_minmax", "surface", Some(0.1)),
            entry("euclidean_standard", "surface", Some(0.4)),
        ]);
        let order: Vec<&str> = board.iter().map(|e| e.strategy.as_str()).collect();
        assert_eq!(
            order,
            vec!["euclidean_minmax", "hierarchical", "euclidean_standard", "combined_geo"]
        );
        assert_eq!(board.best().unwrap().strategy, "euclidean_minmax");
    }

    #[test]
    fn test_best_requires_a_score() {
        let board = Leaderboard::new(vec![entry("hierarchical", "surface", None)]);
        assert!(board.best().is_none());
        assert!(Leaderboard::default().is_empty());
    }

    #[test]
    fn test_serializes_as_array() {
        let board = Leaderboard::new(vec![entry("hierarchical", "surface", Some(0.5))]);
        let json = serde_json::to_value(&board).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["aggregate_score"], 0.5);
    }
}
