//! Writing ranking results and leaderboards
//!
//! Files are replaced atomically: the full document is rendered in memory and
//! then swapped in, so a reader never sees a half-written report.

use crate::dataset::Format;
use crate::error::{Result, StorageError};
use atomicwrites::{AllowOverwrite, AtomicFile};
use comparables_experiments::Leaderboard;
use comparables_similarity::{ScoredListing, SCORE_COLUMN};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Replace `path` with `bytes`
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    AtomicFile::new(path, AllowOverwrite)
        .write(|f| f.write_all(bytes))
        .map_err(|e| StorageError::AtomicWrite(e.to_string()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "report written");
    Ok(())
}

/// Pretty-printed JSON of any serializable value
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)
}

/// Leaderboard as JSON or CSV, by extension
pub fn write_leaderboard(path: impl AsRef<Path>, leaderboard: &Leaderboard) -> Result<()> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Json => write_json(path, leaderboard),
        Format::Csv => write_atomic(path, &leaderboard_csv(leaderboard)?),
    }
}

/// Ranking results as flat rows (original columns plus the score), by extension
pub fn write_results(
    path: impl AsRef<Path>,
    results: &[ScoredListing],
    id_column: &str,
) -> Result<()> {
    let path = path.as_ref();
    let rows: Vec<Map<String, Value>> = results.iter().map(|r| r.to_row(id_column)).collect();
    match Format::from_path(path)? {
        Format::Json => write_json(path, &rows),
        Format::Csv => write_atomic(path, &rows_csv(&rows, id_column)?),
    }
}

pub fn leaderboard_csv(leaderboard: &Leaderboard) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in leaderboard {
        writer.serialize(entry)?;
    }
    writer.into_inner().map_err(|e| StorageError::Io(e.into_error()))
}

/// Header is the id column, the other columns sorted, then the score
pub fn rows_csv(rows: &[Map<String, Value>], id_column: &str) -> Result<Vec<u8>> {
    let mut columns: Vec<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .filter(|c| *c != id_column && *c != SCORE_COLUMN)
        .collect();
    columns.sort_unstable();
    columns.dedup();

    let mut header = Vec::with_capacity(columns.len() + 2);
    header.push(id_column);
    header.extend(columns);
    header.push(SCORE_COLUMN);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;
    for row in rows {
        writer.write_record(header.iter().map(|column| cell_text(row.get(*column))))?;
    }
    writer.into_inner().map_err(|e| StorageError::Io(e.into_error()))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
