//! Name-based entry point used by the harness and the CLI

use crate::distance::GeoBlend;
use crate::explain::{RankResponse, ScoredListing};
use crate::strategy::{Ranker, Strategy};
use comparables_core::{ListingTable, Query, Result};

/// Rank `table` against `query` with the strategy registered as `strategy_name`.
///
/// Fails with `UnknownStrategy` for unregistered names; every other error is
/// whatever the selected strategy raises.
pub fn rank_by(
    strategy_name: &str,
    table: &ListingTable,
    query: &Query,
    limit: usize,
) -> Result<Vec<ScoredListing>> {
    let strategy: Strategy = strategy_name.parse()?;
    strategy.rank(table, query, limit)
}

/// [`rank_by`] with per-call statistics and an optional geo weighting
pub fn rank_with_stats(
    strategy_name: &str,
    table: &ListingTable,
    query: &Query,
    limit: usize,
    blend: Option<GeoBlend>,
) -> Result<RankResponse> {
    let strategy: Strategy = strategy_name.parse()?;
    let ranker = Ranker::new(strategy).with_blend(blend.unwrap_or_default());
    let (result, stats) = ranker.rank_with_stats(table, query, limit)?;
    Ok(RankResponse { result, stats })
}

/// Names accepted by [`rank_by`]
pub fn strategy_names() -> Vec<&'static str> {
    Strategy::ALL.iter().map(Strategy::name).collect()
}
