//! # comparables similarity
//!
//! Ranking strategies for comparable listings.
//!
//! This crate provides:
//!
//! - [`FeatureSetRegistry`] - Named lists of numeric columns
//! - [`Strategy`] / [`Ranker`] - Plain, hierarchical and geo-blended ranking
//! - [`rank_by`] - Dispatch on a strategy name
//! - [`ScoredListing`] / [`RankStats`] - Explainable results
//!
//! ## Example
//!
//! ```rust
//! use comparables_core::{Listing, ListingTable, Query, TableConfig};
//! use comparables_similarity::rank_by;
//! use serde_json::json;
//!
//! let table = ListingTable::from_listings(TableConfig::default(), vec![
//!     Listing::from_json(1u64, json!({"neighborhood": "Roma", "property_type": "house", "price": 100.0})),
//!     Listing::from_json(2u64, json!({"neighborhood": "Roma", "property_type": "house", "price": 300.0})),
//!     Listing::from_json(3u64, json!({"neighborhood": "Roma", "property_type": "house", "price": 180.0})),
//! ]);
//!
//! let query = Query::new()
//!     .with("neighborhood", "Roma")
//!     .with("property_type", "house")
//!     .with("price", 200.0);
//!
//! let results = rank_by("hierarchical", &table, &query, 2).unwrap();
//! assert_eq!(results[0].id.to_string(), "3");
//! assert!(results[0].similarity_score <= results[1].similarity_score);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Query    │────>│    Tiers    │────>│ Candidate   │
//! │ (features)  │     │  (filters)  │     │    pool     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Scored    │<────│ Scale + L2  │
//!                     │  listings   │     │ (+ geo)     │
//!                     └─────────────┘     └─────────────┘
//! ```

pub mod distance;
pub mod explain;
pub mod facade;
pub mod feature_set;
pub mod strategy;

pub use distance::{geo_distances, normalized_geo_distances, GeoBlend};
pub use explain::{mean_score, GeoComponents, RankResponse, RankStats, ScoredListing, SCORE_COLUMN};
pub use facade::{rank_by, rank_with_stats, strategy_names};
pub use feature_set::{FeatureSet, FeatureSetRegistry, RegistryError};
pub use strategy::{Ranker, Strategy, Tier, DEFAULT_LIMIT};
