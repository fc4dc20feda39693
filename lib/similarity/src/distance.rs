//! Distance composition for ranking
//!
//! Feature-space distances come from the scaled pool; geographic distances
//! are great-circle kilometres normalized by the tier's own maximum. The geo
//! strategy blends both into one score where lower means more similar.

use comparables_core::{haversine_km, normalize_by_max, Listing};
use serde::{Deserialize, Serialize};

/// Weights of the feature and geographic components in a blended score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBlend {
    pub feature_weight: f64,
    pub geo_weight: f64,
}

impl Default for GeoBlend {
    fn default() -> Self {
        Self {
            feature_weight: 0.5,
            geo_weight: 0.5,
        }
    }
}

impl GeoBlend {
    /// Weights rescaled to sum to 1.0; negative weights count as zero.
    ///
    /// Falls back to the equal split when both weights are zero.
    pub fn new(feature_weight: f64, geo_weight: f64) -> Self {
        let f = if feature_weight.is_finite() { feature_weight.max(0.0) } else { 0.0 };
        let g = if geo_weight.is_finite() { geo_weight.max(0.0) } else { 0.0 };
        let total = f + g;
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            feature_weight: f / total,
            geo_weight: g / total,
        }
    }

    #[inline]
    pub fn combine(&self, feature_distance: f64, geo_normalized: f64) -> f64 {
        self.feature_weight * feature_distance + self.geo_weight * geo_normalized
    }
}

/// Great-circle distance from `origin` to each listing, in kilometres.
///
/// Listings without coordinates get `NaN`.
pub fn geo_distances(origin: (f64, f64), pool: &[&Listing]) -> Vec<f64> {
    pool.iter()
        .map(|l| l.coordinates().map_or(f64::NAN, |c| haversine_km(origin, c)))
        .collect()
}

/// Geo distances and their per-pool normalization, in pool order
pub fn normalized_geo_distances(origin: (f64, f64), pool: &[&Listing]) -> (Vec<f64>, Vec<f64>) {
    let km = geo_distances(origin, pool);
    let normalized = normalize_by_max(&km);
    (km, normalized)
}
