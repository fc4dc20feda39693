//! Ranking queries
//!
//! A query maps column names to the values a user is looking for. Categorical
//! and coordinate keys steer filtering; every other key is a numeric feature.

use crate::listing::{numeric_value, is_missing, Listing, LATITUDE, LONGITUDE, NEIGHBORHOOD, PROPERTY_TYPE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys never treated as numeric features by the categorical strategies
pub const CATEGORICAL_KEYS: &[&str] = &[NEIGHBORHOOD, PROPERTY_TYPE];

/// Keys never treated as numeric features by the geo-aware strategy
pub const GEO_RESERVED_KEYS: &[&str] = &[NEIGHBORHOOD, PROPERTY_TYPE, LATITUDE, LONGITUDE];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    fields: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse a JSON object into a query
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::Serialization(format!(
                "query must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Query built from a listing: the given features plus the categorical and
    /// coordinate columns, keeping only cells that are present and not missing
    pub fn from_listing(listing: &Listing, features: &[String]) -> Self {
        let mut fields = Map::new();
        let extra = [NEIGHBORHOOD, PROPERTY_TYPE, LATITUDE, LONGITUDE];
        for key in features.iter().map(String::as_str).chain(extra) {
            if let Some(value) = listing.get(key) {
                if !is_missing(value) {
                    fields.insert(key.to_string(), value.clone());
                }
            }
        }
        Self { fields }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Non-finite numbers are stored as null
    #[must_use]
    pub fn with_number(self, key: &str, value: f64) -> Self {
        let value = serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.with(key, value)
    }

    #[must_use]
    pub fn with_text(self, key: &str, value: &str) -> Self {
        self.with(key, value)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(numeric_value)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn neighborhood(&self) -> Option<&str> {
        self.text(NEIGHBORHOOD)
    }

    pub fn property_type(&self) -> Option<&str> {
        self.text(PROPERTY_TYPE)
    }

    /// Value to compare a categorical column against; `Null` when absent
    pub fn category(&self, key: &str) -> Value {
        self.fields.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.number(LATITUDE)?, self.number(LONGITUDE)?))
    }

    /// Numeric features of the query in key order, skipping `reserved` keys.
    ///
    /// Fails when a non-reserved key does not hold a number.
    pub fn numeric_features(&self, reserved: &[&str]) -> Result<(Vec<String>, Vec<f64>)> {
        let mut names = Vec::new();
        let mut values = Vec::new();
        for (key, value) in &self.fields {
            if reserved.contains(&key.as_str()) {
                continue;
            }
            let number =
                numeric_value(value).ok_or_else(|| Error::NonNumericQueryValue(key.clone()))?;
            names.push(key.clone());
            values.push(number);
        }
        Ok((names, values))
    }
}

impl From<Map<String, Value>> for Query {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_map(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_features_skip_reserved() {
        let query = Query::new()
            .with("latitude", 19.4)
            .with("neighborhood", "A")
            .with("num_bedrooms", 2)
            .with("price", 100.0)
            .with("property_type", "house");

        let (names, values) = query.numeric_features(CATEGORICAL_KEYS).unwrap();
        assert_eq!(names, vec!["latitude", "num_bedrooms", "price"]);
        assert_eq!(values, vec![19.4, 2.0, 100.0]);

        let (names, _) = query.numeric_features(GEO_RESERVED_KEYS).unwrap();
        assert_eq!(names, vec!["num_bedrooms", "price"]);
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let query = Query::new().with("neighborhood", "A").with("price", "cheap");
        assert!(matches!(
            query.numeric_features(CATEGORICAL_KEYS),
            Err(Error::NonNumericQueryValue(ref k)) if k == "price"
        ));
    }

    #[test]
    fn test_from_listing_skips_missing() {
        let listing = Listing::from_json(
            1u64,
            json!({
                "neighborhood": "A",
                "property_type": "house",
                "price": 10.0,
                "age": null,
                "latitude": 19.0,
                "url_ad": "http://example.com"
            }),
        );
        let features = vec!["price".to_string(), "age".to_string(), "type_house".to_string()];
        let query = Query::from_listing(&listing, &features);

        let mut keys: Vec<&str> = query.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["latitude", "neighborhood", "price", "property_type"]);
        assert_eq!(query.coordinates(), None);
    }

    #[test]
    fn test_category_defaults_to_null() {
        let query = Query::new().with("property_type", "condo");
        assert_eq!(query.category("property_type"), json!("condo"));
        assert_eq!(query.category("neighborhood"), Value::Null);
    }

    #[test]
    fn test_from_json() {
        let query = Query::from_json(json!({"neighborhood": "A", "price": 1})).unwrap();
        assert_eq!(query.neighborhood(), Some("A"));
        assert!(Query::from_json(json!([1, 2])).is_err());
    }
}
