use crate::{Error, Listing, Result};

/// Dense row-major matrix of the selected numeric features of a candidate pool
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    features: Vec<String>,
    n_rows: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Gather `features` from each listing, in order.
    ///
    /// Fails when no features are requested or a listing has no numeric value
    /// for one of them.
    pub fn from_listings(listings: &[&Listing], features: &[String]) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::NoFeatures);
        }
        let mut data = Vec::with_capacity(listings.len() * features.len());
        for listing in listings {
            for feature in features {
                let value = listing
                    .number(feature)
                    .ok_or_else(|| Error::MissingFeature(feature.clone()))?;
                data.push(value);
            }
        }
        Ok(Self {
            features: features.to_vec(),
            n_rows: listings.len(),
            data,
        })
    }

    /// Build from explicit rows; every row must have one value per feature
    pub fn from_rows(features: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::NoFeatures);
        }
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * features.len());
        for row in rows {
            if row.len() != features.len() {
                return Err(Error::InvalidDimension {
                    expected: features.len(),
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            features,
            n_rows,
            data,
        })
    }

    pub(crate) fn from_raw(features: Vec<String>, n_rows: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), n_rows * features.len());
        Self {
            features,
            n_rows,
            data,
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[f64] {
        let width = self.n_features();
        &self.data[index * width..(index + 1) * width]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.n_features())
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.data
            .iter()
            .skip(index)
            .step_by(self.n_features())
            .copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Euclidean distance from every row to `query`
    pub fn l2_distances(&self, query: &[f64]) -> Result<Vec<f64>> {
        if query.len() != self.n_features() {
            return Err(Error::InvalidDimension {
                expected: self.n_features(),
                actual: query.len(),
            });
        }
        Ok(self.rows().map(|row| l2_distance(row, query)).collect())
    }
}

/// Euclidean distance between two equally sized vectors
#[inline]
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
