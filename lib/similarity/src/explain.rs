//! Scored results and their explanation
//!
//! A ranking call returns owned [`ScoredListing`]s: the listing itself, its
//! similarity score (lower is more similar), the tier it came from and, for
//! the geo strategy, the blended components.

use comparables_core::{Listing, ListingId};
use serde::Serialize;
use serde_json::{Map, Value};

/// Column added to flattened result rows
pub const SCORE_COLUMN: &str = "similarity_score";

/// Components of a blended feature + geo score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoComponents {
    /// Euclidean distance in the tier's scaled feature space
    pub feature_distance: f64,
    /// Great-circle distance to the query, kilometres
    pub geo_distance_km: f64,
    /// `geo_distance_km` divided by the tier's largest geo distance
    pub geo_normalized: f64,
}

/// A listing annotated with its similarity score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    pub id: ListingId,
    pub similarity_score: f64,
    /// 1-based tier the listing was drawn from
    pub tier: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<GeoComponents>,
    pub payload: Map<String, Value>,
    /// Position of the listing in the source table
    #[serde(skip)]
    pub row: usize,
}

impl ScoredListing {
    pub fn new(listing: &Listing, row: usize, tier: usize, similarity_score: f64) -> Self {
        Self {
            id: listing.id.clone(),
            similarity_score,
            tier,
            components: None,
            payload: listing.payload.clone(),
            row,
        }
    }

    #[must_use]
    pub fn with_components(mut self, components: GeoComponents) -> Self {
        self.components = Some(components);
        self
    }

    /// Original columns plus `similarity_score`, as one flat row
    pub fn to_row(&self, id_column: &str) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert(id_column.to_string(), self.id.to_value());
        for (k, v) in &self.payload {
            row.insert(k.clone(), v.clone());
        }
        row.insert(SCORE_COLUMN.to_string(), json_number(self.similarity_score));
        row
    }

    /// Rebuild the listing this result was drawn from
    pub fn to_listing(&self) -> Listing {
        Listing::new(self.id.clone(), self.payload.clone())
    }
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Mean similarity score over results, ignoring undefined scores
pub fn mean_score(results: &[ScoredListing]) -> Option<f64> {
    let scores: Vec<f64> = results
        .iter()
        .map(|r| r.similarity_score)
        .filter(|s| !s.is_nan())
        .collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Summary statistics for one ranking call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankStats {
    pub strategy: String,
    /// Rows in all tiers that were scored
    pub candidates_count: usize,
    /// Tiers that contributed rows, 1-based
    pub tiers_used: Vec<usize>,
    /// Tiers skipped because they were empty or could not be scaled
    pub tiers_skipped: Vec<usize>,
    pub results_count: usize,
    pub mean_score: Option<f64>,
    pub best_score: Option<f64>,
}

impl RankStats {
    pub fn compute(
        strategy: &str,
        results: &[ScoredListing],
        candidates_count: usize,
        tiers_used: Vec<usize>,
        tiers_skipped: Vec<usize>,
    ) -> Self {
        Self {
            strategy: strategy.to_string(),
            candidates_count,
            tiers_used,
            tiers_skipped,
            results_count: results.len(),
            mean_score: mean_score(results),
            // Results are sorted
            best_score: results.first().map(|r| r.similarity_score),
        }
    }
}

/// Response structure for a ranking request
#[derive(Debug, Clone, Serialize)]
pub struct RankResponse {
    pub result: Vec<ScoredListing>,
    pub stats: RankStats,
}
