//! # comparables experiments
//!
//! Evaluates every (strategy, feature set) combination by ranking each row of
//! the table against the table itself, then orders the combinations on a
//! [`Leaderboard`] by mean similarity score.
//!
//! Rows that fail to rank are recorded as [`RowOutcome::Absent`] and left out
//! of the mean; the sweep itself never aborts.

pub mod config;
pub mod harness;
pub mod leaderboard;

pub use config::ExperimentConfig;
pub use harness::{aggregate, evaluate_row, CombinationReport, ExperimentReport, ExperimentRunner, RowOutcome};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
