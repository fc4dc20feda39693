//! # comparables core
//!
//! Core data structures for ranking real-estate listings by similarity.
//!
//! This crate provides:
//!
//! - [`Listing`] - One row of the cleaned dataset (id + columns)
//! - [`ListingTable`] - The in-memory, read-only table of listings
//! - [`Query`] - What the user is looking for
//! - [`ListingFilter`] - Categorical conditions used to build candidate tiers
//! - [`FeatureMatrix`] / [`Normalizer`] - Per-pool feature scaling
//! - [`geo`] - Great-circle distances
//!
//! ## Example
//!
//! ```rust
//! use comparables_core::{Listing, ListingTable, TableConfig, Scaling, scale};
//! use serde_json::json;
//!
//! let table = ListingTable::from_listings(TableConfig::default(), vec![
//!     Listing::from_json(1u64, json!({"price": 100.0, "num_bedrooms": 2})),
//!     Listing::from_json(2u64, json!({"price": 300.0, "num_bedrooms": 4})),
//! ]);
//!
//! let pool: Vec<&Listing> = table.iter().collect();
//! let features = vec!["price".to_string(), "num_bedrooms".to_string()];
//! let scaled = scale(Scaling::MinMax, &pool, &features, &[200.0, 3.0]).unwrap();
//! assert_eq!(scaled.query, vec![0.5, 0.5]);
//! ```

pub mod error;
pub mod filter;
pub mod geo;
pub mod listing;
pub mod matrix;
pub mod query;
pub mod scale;
pub mod table;

pub use error::{Error, ErrorKind, Result};
pub use filter::{Filter, FilterCondition, ListingFilter};
pub use geo::{haversine_km, normalize_by_max};
pub use listing::{Listing, ListingId, LATITUDE, LONGITUDE, NEIGHBORHOOD, PROPERTY_TYPE};
pub use matrix::{l2_distance, FeatureMatrix};
pub use query::{Query, CATEGORICAL_KEYS, GEO_RESERVED_KEYS};
pub use scale::{min_max, scale, scale_matrix, standardize, Normalizer, Scaled, Scaling, MIN_POOL_ROWS};
pub use table::{ListingTable, TableConfig, DEFAULT_ID_COLUMN};
