//! # comparables
//!
//! Find the listings most similar to a target property.
//!
//! A query names a neighborhood, a property type and a handful of numeric
//! features. Candidates are drawn from an in-memory table, scaled per pool, and
//! scored by Euclidean distance (optionally blended with geographic distance).
//! Lower scores mean more similar.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! comparables rank --data listings.csv --strategy hierarchical \
//!     --query '{"neighborhood": "Roma Norte", "property_type": "house", "price": 4500000}'
//! comparables experiment --data listings.csv --output leaderboard.csv
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use comparables::prelude::*;
//! use serde_json::json;
//!
//! let table = ListingTable::from_listings(TableConfig::default(), vec![
//!     Listing::from_json(1u64, json!({"neighborhood": "A", "property_type": "house", "price": 100.0})),
//!     Listing::from_json(2u64, json!({"neighborhood": "A", "property_type": "house", "price": 200.0})),
//!     Listing::from_json(3u64, json!({"neighborhood": "B", "property_type": "house", "price": 150.0})),
//! ]);
//!
//! let query = Query::new()
//!     .with_text("neighborhood", "A")
//!     .with_text("property_type", "house")
//!     .with_number("price", 120.0);
//!
//! let results = rank_by("hierarchical", &table, &query, 2).unwrap();
//! assert_eq!(results.len(), 2);
//! assert!(results.iter().all(|r| r.tier == 1));
//! ```
//!
//! ## Crate Structure
//!
//! - `comparables-core` - Listings, tables, queries, filters, scaling, geodesic distance
//! - `comparables-similarity` - Feature sets, ranking strategies, the `rank_by` facade
//! - `comparables-experiments` - Strategy x feature-set evaluation and leaderboard
//! - `comparables-storage` - JSON / CSV datasets and atomic report files

// Re-export core types
pub use comparables_core::{
    Error, ErrorKind, Listing, ListingFilter, ListingId, ListingTable, Normalizer, Query, Result,
    Scaling, TableConfig,
};

// Re-export ranking
pub use comparables_similarity::{
    rank_by, rank_with_stats, FeatureSet, FeatureSetRegistry, GeoBlend, RankStats, Ranker,
    ScoredListing, Strategy,
};

// Re-export experiments
pub use comparables_experiments::{ExperimentConfig, ExperimentRunner, Leaderboard, RowOutcome};

// Re-export storage
pub use comparables_storage::StorageError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        rank_by, Error, ExperimentConfig, ExperimentRunner, FeatureSetRegistry, Leaderboard,
        Listing, ListingId, ListingTable, Query, Result, ScoredListing, Strategy, TableConfig,
    };
}

/// Dataset loading and report writing
pub mod io {
    pub use comparables_storage::{load, load_csv, load_json, write_leaderboard, write_results, Format};
}
