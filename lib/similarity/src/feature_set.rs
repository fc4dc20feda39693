//! Feature-set registry
//!
//! Named, ordered lists of numeric columns that make up the feature space of
//! one ranking attempt. Sets may overlap or even repeat each other.

use comparables_core::Error;
use serde::{Deserialize, Serialize};

/// A named list of numeric columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSet {
    pub name: String,
    pub features: Vec<String>,
}

impl FeatureSet {
    pub fn new(name: impl Into<String>, features: &[&str]) -> Self {
        Self {
            name: name.into(),
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Feature-set registry version 1
///
/// Immutable once built; the harness iterates it in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSetRegistry {
    /// Registry version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    sets: Vec<FeatureSet>,
}

fn default_version() -> u32 {
    1
}

impl FeatureSetRegistry {
    /// Create a registry, rejecting empty or ambiguous definitions
    pub fn new(sets: Vec<FeatureSet>) -> Result<Self, RegistryError> {
        let registry = Self { version: 1, sets };
        registry.validate()?;
        Ok(registry)
    }

    /// The six sets compared by the default experiment
    pub fn builtin() -> Self {
        Self {
            version: 1,
            sets: vec![
                FeatureSet::new(
                    "surface",
                    &["price", "num_bedrooms", "num_bathrooms", "age", "construction_surface"],
                ),
                FeatureSet::new(
                    "surface_improved",
                    &["price_per_m2", "num_bedrooms", "num_bathrooms", "age", "has_amenities"],
                ),
                FeatureSet::new("price_rooms", &["price", "num_bedrooms", "num_bathrooms"]),
                FeatureSet::new(
                    "all_numeric",
                    &["price", "num_bedrooms", "num_bathrooms", "age", "construction_surface"],
                ),
                FeatureSet::new(
                    "improved",
                    &[
                        "construction_surface",
                        "age",
                        "num_bathrooms",
                        "num_bedrooms",
                        "type_house",
                        "price_per_m2",
                        "has_amenities",
                    ],
                ),
                FeatureSet::new(
                    "no_categorial",
                    &[
                        "construction_surface",
                        "age",
                        "num_bathrooms",
                        "num_bedrooms",
                        "num_parking_lots",
                        "price_per_m2",
                        "has_amenities",
                    ],
                ),
            ],
        }
    }

    /// Parse and validate a registry from JSON
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let registry: Self =
            serde_json::from_str(json).map_err(|e| RegistryError::Parse(e.to_string()))?;
        registry.validate()?;
        Ok(registry)
    }

    /// Validate the registry
    /// - At least one set
    /// - Names are non-empty and unique
    /// - Every set lists at least one column
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.sets.is_empty() {
            return Err(RegistryError::EmptyRegistry);
        }
        for (i, set) in self.sets.iter().enumerate() {
            if set.name.trim().is_empty() {
                return Err(RegistryError::EmptyName(i));
            }
            if set.features.is_empty() {
                return Err(RegistryError::NoFeatures(set.name.clone()));
            }
            if self.sets[..i].iter().any(|s| s.name == set.name) {
                return Err(RegistryError::DuplicateName(set.name.clone()));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    /// Like [`get`](Self::get) but fails with `UnknownFeatureSet`
    pub fn resolve(&self, name: &str) -> Result<&FeatureSet, Error> {
        self.get(name)
            .ok_or_else(|| Error::UnknownFeatureSet(name.to_string()))
    }

    /// Keep only the named sets, in registry order
    pub fn subset(&self, names: &[String]) -> Result<Self, Error> {
        for name in names {
            self.resolve(name)?;
        }
        Ok(Self {
            version: self.version,
            sets: self
                .sets
                .iter()
                .filter(|s| names.contains(&s.name))
                .cloned()
                .collect(),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.sets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for FeatureSetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a FeatureSetRegistry {
    type Item = &'a FeatureSet;
    type IntoIter = std::slice::Iter<'a, FeatureSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

/// Errors that can occur during registry validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry cannot be empty")]
    EmptyRegistry,

    #[error("Feature set #{0} has an empty name")]
    EmptyName(usize),

    #[error("Feature set '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("Feature set '{0}' lists no features")]
    NoFeatures(String),

    #[error("Invalid registry JSON: {0}")]
    Parse(String),
}
