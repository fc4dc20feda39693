use anyhow::Context;
use clap::{Parser, Subcommand};
use comparables_core::{Query, TableConfig, DEFAULT_ID_COLUMN};
use comparables_experiments::{ExperimentConfig, ExperimentRunner, Leaderboard};
use comparables_similarity::{rank_with_stats, FeatureSetRegistry, GeoBlend, Strategy, DEFAULT_LIMIT};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Find the listings most similar to a target property
#[derive(Parser, Debug)]
#[command(name = "comparables")]
#[command(about = "Rank comparable real-estate listings", long_about = None, version)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the dataset against one query
    Rank {
        /// Cleaned dataset (.json or .csv)
        #[arg(short, long)]
        data: PathBuf,

        /// Strategy name (see `strategies`)
        #[arg(short, long, default_value = "hierarchical")]
        strategy: String,

        /// Query as a JSON object, or @path to a JSON file
        #[arg(short, long)]
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Identifier column of the dataset
        #[arg(long, default_value = DEFAULT_ID_COLUMN)]
        id_column: String,

        /// Weight of the feature distance in combined_geo
        #[arg(long)]
        feature_weight: Option<f64>,

        /// Weight of the geographic distance in combined_geo
        #[arg(long)]
        geo_weight: Option<f64>,

        /// Write results to this file (.json or .csv) instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate every strategy x feature set combination
    Experiment {
        /// Cleaned dataset (.json or .csv)
        #[arg(short, long)]
        data: PathBuf,

        /// Experiment configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Feature-set registry (JSON), replaces the configured one
        #[arg(long)]
        feature_sets: Option<PathBuf>,

        /// Only run these strategies (comma separated)
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,

        /// Results requested per ranking call
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Evaluate rows on the current thread only
        #[arg(long)]
        sequential: bool,

        /// Identifier column of the dataset
        #[arg(long, default_value = DEFAULT_ID_COLUMN)]
        id_column: String,

        /// Write the leaderboard to this file (.json or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the feature sets of a registry
    FeatureSets {
        /// Feature-set registry (JSON); the built-in one when omitted
        #[arg(long)]
        feature_sets: Option<PathBuf>,
    },

    /// List the available strategies
    Strategies,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries results
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Rank {
            data,
            strategy,
            query,
            limit,
            id_column,
            feature_weight,
            geo_weight,
            output,
        } => {
            let table = load_table(&data, &id_column)?;
            let query = parse_query(&query)?;
            let blend = match (feature_weight, geo_weight) {
                (None, None) => None,
                (f, g) => Some(GeoBlend::new(f.unwrap_or(0.5), g.unwrap_or(0.5))),
            };

            let response = rank_with_stats(&strategy, &table, &query, limit, blend)?;
            info!(
                strategy = %strategy,
                results = response.stats.results_count,
                tiers_used = ?response.stats.tiers_used,
                "ranking done"
            );

            match output {
                Some(path) => {
                    comparables_storage::write_results(&path, &response.result, table.id_column())?;
                    info!("Results written to {:?}", path);
                }
                None => {
                    let rows: Vec<_> = response
                        .result
                        .iter()
                        .map(|r| r.to_row(table.id_column()))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
            }
        }

        Command::Experiment {
            data,
            config,
            feature_sets,
            strategies,
            limit,
            sequential,
            id_column,
            output,
        } => {
            let mut config = match config {
                Some(path) => ExperimentConfig::from_file(&path)
                    .with_context(|| format!("loading experiment config {:?}", path))?,
                None => ExperimentConfig::default(),
            };
            if let Some(path) = feature_sets {
                config.feature_sets = load_registry(&path)?;
            }
            if !strategies.is_empty() {
                config.strategies = strategies
                    .iter()
                    .map(|s| s.parse::<Strategy>())
                    .collect::<Result<_, _>>()?;
            }
            if let Some(limit) = limit {
                config.limit = limit;
            }
            if sequential {
                config.parallel = false;
            }

            let table = load_table(&data, &id_column)?;
            info!(
                "Running {} combinations over {} rows",
                config.combinations(),
                table.len()
            );
            let report = ExperimentRunner::new(&table, config)?.run();

            print_leaderboard(&report.leaderboard);
            if let Some(path) = output {
                comparables_storage::write_leaderboard(&path, &report.leaderboard)?;
                info!("Leaderboard written to {:?}", path);
            }
        }

        Command::FeatureSets { feature_sets } => {
            let registry = match feature_sets {
                Some(path) => load_registry(&path)?,
                None => FeatureSetRegistry::builtin(),
            };
            for set in &registry {
                println!("{:<20} {}", set.name, set.features.join(", "));
            }
        }

        Command::Strategies => {
            for strategy in Strategy::ALL {
                let tiers = if strategy.is_tiered() { "tiered" } else { "whole table" };
                println!("{:<20} {:?} scaling, {}", strategy.name(), strategy.scaling(), tiers);
            }
        }
    }

    Ok(())
}

fn load_table(path: &Path, id_column: &str) -> anyhow::Result<comparables_core::ListingTable> {
    let config = TableConfig {
        id_column: id_column.to_string(),
        ..TableConfig::default()
    };
    comparables_storage::load(path, config).with_context(|| format!("loading dataset {:?}", path))
}

fn load_registry(path: &Path) -> anyhow::Result<FeatureSetRegistry> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading feature sets {:?}", path))?;
    Ok(FeatureSetRegistry::from_json(&json)?)
}

/// Accepts a JSON object literal or `@file`
fn parse_query(raw: &str) -> anyhow::Result<Query> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading query {}", path))?,
        None => raw.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(&text).context("query is not valid JSON")?;
    Ok(Query::from_json(value)?)
}

fn print_leaderboard(leaderboard: &Leaderboard) {
    println!(
        "{:<20} {:<20} {:>12} {:>8} {:>8}",
        "strategy", "feature_set", "score", "scored", "absent"
    );
    for entry in leaderboard {
        let score = entry
            .aggregate_score
            .map_or_else(|| "-".to_string(), |s| format!("{:.6}", s));
        println!(
            "{:<20} {:<20} {:>12} {:>8} {:>8}",
            entry.strategy, entry.feature_set, score, entry.scored_rows, entry.absent_rows
        );
    }
}
