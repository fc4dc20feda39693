//! Feature scaling fitted on a candidate pool
//!
//! Each call fits its own transform on the pool and pushes the query through
//! the same fitted parameters, so pool and query share one coordinate system.
//! Nothing is cached between calls.

use crate::matrix::FeatureMatrix;
use crate::{Error, Listing, Result};
use serde::{Deserialize, Serialize};

/// Smallest pool for which scaling statistics are defined
pub const MIN_POOL_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// Subtract the mean, divide by the population standard deviation
    Standard,
    /// Rescale to [0, 1] using the pool's own min and max
    MinMax,
}

/// A fitted per-feature affine transform: `(x - offset) / scale`.
///
/// Features whose scale is zero (constant over the pool) map to 0 for every
/// input, so they add nothing to a distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    scaling: Scaling,
    offsets: Vec<f64>,
    scales: Vec<f64>,
}

impl Normalizer {
    pub fn fit(scaling: Scaling, pool: &FeatureMatrix) -> Result<Self> {
        if pool.n_rows() < MIN_POOL_ROWS {
            return Err(Error::PoolTooSmall {
                rows: pool.n_rows(),
                min: MIN_POOL_ROWS,
            });
        }

        let n = pool.n_rows() as f64;
        let mut offsets = Vec::with_capacity(pool.n_features());
        let mut scales = Vec::with_capacity(pool.n_features());

        for j in 0..pool.n_features() {
            let (offset, scale) = match scaling {
                Scaling::Standard => {
                    let mean = pool.column(j).sum::<f64>() / n;
                    let var = pool.column(j).map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
                    (mean, var.sqrt())
                }
                Scaling::MinMax => {
                    let (min, max) = pool
                        .column(j)
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                            (lo.min(x), hi.max(x))
                        });
                    (min, max - min)
                }
            };
            offsets.push(offset);
            scales.push(if is_degenerate(offset, scale) { 0.0 } else { scale });
        }

        Ok(Self {
            scaling,
            offsets,
            scales,
        })
    }

    #[inline]
    pub fn scaling(&self) -> Scaling {
        self.scaling
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.offsets.len()
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Zero marks a constant feature
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(Error::InvalidDimension {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.offsets.iter().zip(self.scales.iter()))
            .map(|(x, (offset, scale))| apply(*x, *offset, *scale))
            .collect())
    }

    pub fn transform(&self, pool: &FeatureMatrix) -> Result<FeatureMatrix> {
        if pool.n_features() != self.n_features() {
            return Err(Error::InvalidDimension {
                expected: self.n_features(),
                actual: pool.n_features(),
            });
        }
        let width = self.n_features();
        let data = pool
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, x)| apply(*x, self.offsets[i % width], self.scales[i % width]))
            .collect();
        Ok(FeatureMatrix::from_raw(
            pool.features().to_vec(),
            pool.n_rows(),
            data,
        ))
    }
}

#[inline]
fn apply(x: f64, offset: f64, scale: f64) -> f64 {
    if scale == 0.0 {
        0.0
    } else {
        (x - offset) / scale
    }
}

#[inline]
fn is_degenerate(offset: f64, scale: f64) -> bool {
    scale <= 10.0 * f64::EPSILON * offset.abs().max(1.0)
}

/// A pool and query expressed in the same fitted coordinate system
#[derive(Debug, Clone)]
pub struct Scaled {
    pub pool: FeatureMatrix,
    pub query: Vec<f64>,
    pub normalizer: Normalizer,
}

impl Scaled {
    /// Euclidean distance from each pool row to the query
    pub fn distances(&self) -> Result<Vec<f64>> {
        self.pool.l2_distances(&self.query)
    }
}

/// Fit `scaling` on `pool[features]` and transform both pool and query
pub fn scale(
    scaling: Scaling,
    pool: &[&Listing],
    features: &[String],
    query: &[f64],
) -> Result<Scaled> {
    let matrix = FeatureMatrix::from_listings(pool, features)?;
    scale_matrix(scaling, &matrix, query)
}

pub fn scale_matrix(scaling: Scaling, matrix: &FeatureMatrix, query: &[f64]) -> Result<Scaled> {
    let normalizer = Normalizer::fit(scaling, matrix)?;
    let query = normalizer.transform_row(query)?;
    let pool = normalizer.transform(matrix)?;
    Ok(Scaled {
        pool,
        query,
        normalizer,
    })
}

/// Standardize `pool[features]` and the query with the pool's mean and deviation
pub fn standardize(pool: &[&Listing], features: &[String], query: &[f64]) -> Result<Scaled> {
    scale(Scaling::Standard, pool, features, query)
}

/// Min-max scale `pool[features]` and the query with the pool's range
pub fn min_max(pool: &[&Listing], features: &[String], query: &[f64]) -> Result<Scaled> {
    scale(Scaling::MinMax, pool, features, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn listings(rows: &[(f64, f64)]) -> Vec<Listing> {
        rows.iter()
            .enumerate()
            .map(|(i, (p, a))| Listing::from_json(i as u64, json!({"price": p, "age": a})))
            .collect()
    }

    #[test]
    fn test_min_max_range() {
        let rows = listings(&[(100.0, 5.0), (200.0, 10.0), (300.0, 15.0)]);
        let pool: Vec<&Listing> = rows.iter().collect();
        let scaled = min_max(&pool, &names(&["price", "age"]), &[200.0, 30.0]).unwrap();

        for row in scaled.pool.rows() {
            for v in row {
                assert!((0.0..=1.0).contains(v));
            }
        }
        assert_eq!(scaled.pool.row(0), &[0.0, 0.0]);
        assert_eq!(scaled.pool.row(2), &[1.0, 1.0]);
        // The query goes through the pool's fit and is not clipped
        assert!((scaled.query[0] - 0.5).abs() < 1e-12);
        assert!((scaled.query[1] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_standardize_population_std() {
        let rows = listings(&[(1.0, 0.0), (3.0, 0.0)]);
        let pool: Vec<&Listing> = rows.iter().collect();
        let scaled = standardize(&pool, &names(&["price"]), &[2.0]).unwrap();
        assert_eq!(scaled.normalizer.offsets(), &[2.0]);
        assert_eq!(scaled.normalizer.scales(), &[1.0]);
        assert_eq!(scaled.pool.row(0), &[-1.0]);
        assert_eq!(scaled.pool.row(1), &[1.0]);
        assert_eq!(scaled.query, vec![0.0]);
    }

    #[test]
    fn test_zero_range_feature_is_constant() {
        let rows = listings(&[(100.0, 7.0), (300.0, 7.0)]);
        let pool: Vec<&Listing> = rows.iter().collect();
        for scaling in [Scaling::Standard, Scaling::MinMax] {
            let scaled = scale(scaling, &pool, &names(&["price", "age"]), &[100.0, 50.0]).unwrap();
            assert_eq!(scaled.normalizer.scales()[1], 0.0);
            assert!(scaled.pool.column(1).all(|v| v == 0.0));
            assert_eq!(scaled.query[1], 0.0);
            assert!(scaled.distances().unwrap().iter().all(|d| d.is_finite()));
        }
    }

    #[test]
    fn test_pool_too_small() {
        let rows = listings(&[(100.0, 1.0)]);
        let pool: Vec<&Listing> = rows.iter().collect();
        assert!(matches!(
            min_max(&pool, &names(&["price"]), &[1.0]),
            Err(Error::PoolTooSmall { rows: 1, min: 2 })
        ));
        assert!(matches!(
            standardize(&[], &names(&["price"]), &[1.0]),
            Err(Error::PoolTooSmall { rows: 0, .. })
        ));
    }

    #[test]
    fn test_missing_feature() {
        let rows = listings(&[(100.0, 1.0), (200.0, 2.0)]);
        let pool: Vec<&Listing> = rows.iter().collect();
        assert!(matches!(
            standardize(&pool, &names(&["price", "surface"]), &[1.0, 2.0]),
            Err(Error::MissingFeature(_))
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let rows = listings(&[(100.0, 1.0), (200.0, 2.0)]);
        let pool: Vec<&Listing> = rows.iter().collect();
        assert!(matches!(
            min_max(&pool, &names(&["price", "age"]), &[1.0]),
            Err(Error::InvalidDimension { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_refit_per_call() {
        let narrow = listings(&[(0.0, 0.0), (10.0, 0.0)]);
        let wide = listings(&[(0.0, 0.0), (100.0, 0.0)]);
        let a: Vec<&Listing> = narrow.iter().collect();
        let b: Vec<&Listing> = wide.iter().collect();
        let q = [5.0];
        let sa = min_max(&a, &names(&["price"]), &q).unwrap();
        let sb = min_max(&b, &names(&["price"]), &q).unwrap();
        assert!((sa.query[0] - 0.5).abs() < 1e-12);
        assert!((sb.query[0] - 0.05).abs() < 1e-12);
    }
}
