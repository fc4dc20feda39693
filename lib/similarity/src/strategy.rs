//! Ranking strategies
//!
//! All four strategies share one loop: build the tier list, and for each tier
//! collect its candidate pool, fit scaling on that pool alone, score every
//! candidate, and stop once the scored pools add up to `limit` rows. A row that
//! appears in two overlapping tiers is kept once, with its lower score. The
//! final set is stably sorted by ascending score and truncated to `limit`.
//!
//! | Strategy | Tiers | Scaling | Score |
//! |----------|-------|---------|-------|
//! | `euclidean_standard` | whole table | standard | feature distance |
//! | `euclidean_minmax` | whole table | min-max | feature distance |
//! | `hierarchical` | same nbhd+type, other nbhd+same type, other type | min-max | feature distance |
//! | `combined_geo` | same nbhd+type, same type, other type | min-max | blend of feature and geo distance |

use crate::distance::{normalized_geo_distances, GeoBlend};
use crate::explain::{GeoComponents, RankStats, ScoredListing};
use ahash::AHashMap;
use comparables_core::{
    scale, Error, Filter, FilterCondition, Listing, ListingFilter, ListingTable, Query, Result,
    Scaling, CATEGORICAL_KEYS, GEO_RESERVED_KEYS, NEIGHBORHOOD, PROPERTY_TYPE,
};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Number of results returned when the caller does not ask for a limit
pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Whole table, standardized features
    #[serde(rename = "euclidean_standard")]
    EuclideanStandard,
    /// Whole table, min-max scaled features
    #[serde(rename = "euclidean_minmax")]
    EuclideanMinMax,
    /// Tiered categorical filter, per-tier min-max scaling
    #[serde(rename = "hierarchical")]
    Hierarchical,
    /// Tiered categorical filter blending feature and geographic distance
    #[serde(rename = "combined_geo")]
    CombinedGeo,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::EuclideanStandard,
        Strategy::EuclideanMinMax,
        Strategy::Hierarchical,
        Strategy::CombinedGeo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::EuclideanStandard => "euclidean_standard",
            Strategy::EuclideanMinMax => "euclidean_minmax",
            Strategy::Hierarchical => "hierarchical",
            Strategy::CombinedGeo => "combined_geo",
        }
    }

    pub fn scaling(&self) -> Scaling {
        match self {
            Strategy::EuclideanStandard => Scaling::Standard,
            _ => Scaling::MinMax,
        }
    }

    /// Query keys that never become numeric features
    pub fn reserved_keys(&self) -> &'static [&'static str] {
        match self {
            Strategy::CombinedGeo => GEO_RESERVED_KEYS,
            _ => CATEGORICAL_KEYS,
        }
    }

    /// Tiered strategies skip tiers that cannot be scored instead of failing
    pub fn is_tiered(&self) -> bool {
        matches!(self, Strategy::Hierarchical | Strategy::CombinedGeo)
    }

    pub fn uses_geo(&self) -> bool {
        matches!(self, Strategy::CombinedGeo)
    }

    /// Candidate tiers for `query`, in priority order
    pub fn tiers(&self, query: &Query) -> SmallVec<[Tier; 3]> {
        let neighborhood = query.category(NEIGHBORHOOD);
        let property_type = query.category(PROPERTY_TYPE);
        let same_both = FilterCondition::And(vec![
            FilterCondition::equals(NEIGHBORHOOD, neighborhood.clone()),
            FilterCondition::equals(PROPERTY_TYPE, property_type.clone()),
        ]);
        let other_type = FilterCondition::not_equals(PROPERTY_TYPE, property_type.clone());

        match self {
            Strategy::EuclideanStandard | Strategy::EuclideanMinMax => {
                smallvec![Tier::new(1, FilterCondition::All)]
            }
            Strategy::Hierarchical => smallvec![
                Tier::new(1, same_both),
                Tier::new(
                    2,
                    FilterCondition::And(vec![
                        FilterCondition::not_equals(NEIGHBORHOOD, neighborhood),
                        FilterCondition::equals(PROPERTY_TYPE, property_type),
                    ]),
                ),
                Tier::new(3, other_type),
            ],
            Strategy::CombinedGeo => smallvec![
                Tier::new(1, same_both),
                Tier::new(2, FilterCondition::equals(PROPERTY_TYPE, property_type)),
                Tier::new(3, other_type),
            ],
        }
    }

    /// Rank `table` against `query` with default options
    pub fn rank(&self, table: &ListingTable, query: &Query, limit: usize) -> Result<Vec<ScoredListing>> {
        Ranker::new(*self).rank(table, query, limit)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}

/// One categorical filter applied to the full table
#[derive(Debug, Clone)]
pub struct Tier {
    /// 1-based priority
    pub level: usize,
    pub filter: ListingFilter,
}

impl Tier {
    pub fn new(level: usize, condition: FilterCondition) -> Self {
        Self {
            level,
            filter: ListingFilter::new(condition),
        }
    }
}

/// Rows of one tier that carry every selected feature
#[derive(Debug, Default)]
struct CandidatePool<'a> {
    rows: Vec<usize>,
    listings: Vec<&'a Listing>,
}

impl<'a> CandidatePool<'a> {
    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Query-derived inputs shared by every tier of one call
#[derive(Debug)]
struct RankPlan {
    features: Vec<String>,
    query_vector: Vec<f64>,
    /// Query coordinates, set only for the geo strategy
    origin: Option<(f64, f64)>,
}

/// Ranks listings of a table against a query with one strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranker {
    strategy: Strategy,
    blend: GeoBlend,
}

impl Ranker {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            blend: GeoBlend::default(),
        }
    }

    /// Override the feature / geo weights of the geo strategy
    #[must_use]
    pub fn with_blend(mut self, blend: GeoBlend) -> Self {
        self.blend = blend;
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn blend(&self) -> GeoBlend {
        self.blend
    }

    /// Up to `limit` listings sorted by ascending similarity score
    pub fn rank(&self, table: &ListingTable, query: &Query, limit: usize) -> Result<Vec<ScoredListing>> {
        self.rank_with_stats(table, query, limit)
            .map(|(results, _)| results)
    }

    pub fn rank_with_stats(
        &self,
        table: &ListingTable,
        query: &Query,
        limit: usize,
    ) -> Result<(Vec<ScoredListing>, RankStats)> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }
        let plan = self.plan(table, query)?;

        let mut selected: Vec<ScoredListing> = Vec::new();
        let mut position: AHashMap<usize, usize> = AHashMap::new();
        let mut candidates_count = 0;
        let mut tiers_used = Vec::new();
        let mut tiers_skipped = Vec::new();

        for tier in self.strategy.tiers(query) {
            let pool = candidate_pool(table, &tier, &plan);
            trace!(
                strategy = self.strategy.name(),
                tier = tier.level,
                candidates = pool.len(),
                "tier pool collected"
            );

            match self.score_tier(table, &tier, &pool, &plan) {
                Ok(scored) => {
                    candidates_count += pool.len();
                    tiers_used.push(tier.level);
                    for s in scored {
                        match position.get(&s.row) {
                            // Overlapping tiers: a repeated row keeps its lowest score
                            Some(&i) => {
                                if s.similarity_score < selected[i].similarity_score {
                                    selected[i] = s;
                                }
                            }
                            None => {
                                position.insert(s.row, selected.len());
                                selected.push(s);
                            }
                        }
                    }
                }
                Err(e) if self.strategy.is_tiered() && e.is_data() => {
                    debug!(
                        strategy = self.strategy.name(),
                        tier = tier.level,
                        error = %e,
                        "skipping tier"
                    );
                    tiers_skipped.push(tier.level);
                    continue;
                }
                Err(e) => return Err(e),
            }

            // Every scored tier counts in full, repeats included
            if candidates_count >= limit {
                break;
            }
        }

        // Stable: equal scores keep tier then table order
        selected.sort_by_key(|s| OrderedFloat(s.similarity_score));
        selected.truncate(limit);

        let stats = RankStats::compute(
            self.strategy.name(),
            &selected,
            candidates_count,
            tiers_used,
            tiers_skipped,
        );
        Ok((selected, stats))
    }

    fn plan(&self, table: &ListingTable, query: &Query) -> Result<RankPlan> {
        if self.strategy.uses_geo() {
            for &key in CATEGORICAL_KEYS {
                if !query.contains_key(key) {
                    return Err(Error::MissingQueryKey(key));
                }
            }
        }

        let (features, query_vector) = query.numeric_features(self.strategy.reserved_keys())?;

        let origin = if self.strategy.uses_geo() {
            let coordinates = match query.coordinates() {
                Some(c) => c,
                None => {
                    let neighborhood = query.neighborhood().unwrap_or_default();
                    let centroid = table
                        .neighborhood_centroid(neighborhood)
                        .ok_or_else(|| Error::NoCoordinates(neighborhood.to_string()))?;
                    debug!(
                        neighborhood,
                        latitude = centroid.0,
                        longitude = centroid.1,
                        "imputed query coordinates"
                    );
                    centroid
                }
            };
            Some(coordinates)
        } else {
            None
        };

        Ok(RankPlan {
            features,
            query_vector,
            origin,
        })
    }

    fn score_tier(
        &self,
        table: &ListingTable,
        tier: &Tier,
        pool: &CandidatePool<'_>,
        plan: &RankPlan,
    ) -> Result<Vec<ScoredListing>> {
        table.require_columns(&plan.features)?;
        let scaled = scale(
            self.strategy.scaling(),
            &pool.listings,
            &plan.features,
            &plan.query_vector,
        )?;
        let feature_distances = scaled.distances()?;

        let scored = match plan.origin {
            None => pool
                .rows
                .iter()
                .zip(pool.listings.iter())
                .zip(feature_distances)
                .map(|((&row, listing), d)| ScoredListing::new(listing, row, tier.level, d))
                .collect(),
            Some(origin) => {
                let (km, geo_normalized) = normalized_geo_distances(origin, &pool.listings);
                pool.rows
                    .iter()
                    .zip(pool.listings.iter())
                    .enumerate()
                    .map(|(i, (&row, listing))| {
                        let components = GeoComponents {
                            feature_distance: feature_distances[i],
                            geo_distance_km: km[i],
                            geo_normalized: geo_normalized[i],
                        };
                        let score = self
                            .blend
                            .combine(components.feature_distance, components.geo_normalized);
                        ScoredListing::new(listing, row, tier.level, score)
                            .with_components(components)
                    })
                    .collect()
            }
        };
        Ok(scored)
    }
}

fn candidate_pool<'a>(table: &'a ListingTable, tier: &Tier, plan: &RankPlan) -> CandidatePool<'a> {
    let needs_coordinates = plan.origin.is_some();
    let mut pool = CandidatePool::default();
    for (row, listing) in table.iter().enumerate() {
        if tier.filter.matches(listing)
            && listing.has_numbers(&plan.features)
            && (!needs_coordinates || listing.coordinates().is_some())
        {
            pool.rows.push(row);
            pool.listings.push(listing);
        }
    }
    pool
}
