//! Reading an already cleaned dataset into a [`ListingTable`]
//!
//! JSON datasets are an array of flat objects. CSV datasets have a header
//! row; cells are parsed as integers, floats, booleans or text, and empty or
//! `nan`/`null` cells count as missing.

use crate::error::{Result, StorageError};
use comparables_core::{ListingTable, TableConfig};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// File formats understood by the loader and the report writers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            _ => Err(StorageError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

const MISSING_MARKERS: [&str; 5] = ["nan", "null", "none", "na", "n/a"];

/// Load a dataset, choosing the parser by extension
pub fn load(path: impl AsRef<Path>, config: TableConfig) -> Result<ListingTable> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Json => load_json(path, config),
        Format::Csv => load_csv(path, config),
    }
}

pub fn load_json(path: impl AsRef<Path>, config: TableConfig) -> Result<ListingTable> {
    let path = path.as_ref();
    let start = Instant::now();
    let file = File::open(path)?;
    let table = read_json(BufReader::new(file), with_name(config, path))?;
    log_loaded(path, &table, start);
    Ok(table)
}

pub fn load_csv(path: impl AsRef<Path>, config: TableConfig) -> Result<ListingTable> {
    let path = path.as_ref();
    let start = Instant::now();
    let file = File::open(path)?;
    let table = read_csv(file, with_name(config, path))?;
    log_loaded(path, &table, start);
    Ok(table)
}

/// Parse a JSON array of objects
pub fn read_json<R: Read>(reader: R, config: TableConfig) -> Result<ListingTable> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(StorageError::InvalidDataset(
            "expected a JSON array of objects".to_string(),
        ));
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(map),
            other => {
                return Err(StorageError::InvalidDataset(format!(
                    "row {} is not an object: {}",
                    index, other
                )))
            }
        }
    }
    Ok(ListingTable::from_records(config, records)?)
}

/// Parse CSV with a header row
pub fn read_csv<R: Read>(reader: R, config: TableConfig) -> Result<ListingTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut map = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            map.insert(header.to_string(), parse_cell(cell));
        }
        records.push(map);
    }
    Ok(ListingTable::from_records(config, records)?)
}

/// Interpret one CSV cell
pub fn parse_cell(raw: &str) -> Value {
    let cell = raw.trim();
    if cell.is_empty() || MISSING_MARKERS.contains(&cell.to_ascii_lowercase().as_str()) {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        return serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number);
    }
    match cell {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

fn with_name(mut config: TableConfig, path: &Path) -> TableConfig {
    if config.name.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            config.name = stem.to_string();
        }
    }
    config
}

fn log_loaded(path: &Path, table: &ListingTable, start: Instant) {
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded dataset"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use comparables_core::ListingId;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("NaN"), Value::Null);
        assert_eq!(parse_cell(" 42 "), json!(42));
        assert_eq!(parse_cell("3.5"), json!(3.5));
        assert_eq!(parse_cell("inf"), Value::Null);
        assert_eq!(parse_cell("True"), json!(true));
        assert_eq!(parse_cell("Roma Norte"), json!("Roma Norte"));
    }

    #[test]
    fn test_read_csv() {
        let data = "\
property_id,neighborhood,property_type,price,age
1,Roma,house,100.5,10
2,Condesa,condo,,nan
";
        let table = read_csv(data.as_bytes(), TableConfig::default()).unwrap();
        assert_eq!(table.len(), 2);

        let first = table.get(&ListingId::Integer(1)).unwrap();
        assert_eq!(first.number("price"), Some(100.5));
        assert_eq!(first.neighborhood(), Some("Roma"));

        let second = table.get(&ListingId::Integer(2)).unwrap();
        assert_eq!(second.number("price"), None);
        assert!(second.get("age").is_none());
        assert!(table.has_column("age"));
    }

    #[test]
    fn test_read_csv_requires_id() {
        let data = "neighborhood,price\nRoma,1\n";
        assert!(matches!(
            read_csv(data.as_bytes(), TableConfig::default()),
            Err(StorageError::Core(_))
        ));
    }

    #[test]
    fn test_read_csv_signed_and_float_ids() {
        let data = "property_id,price\n-12,1\n7.0,2\n";
        let table = read_csv(data.as_bytes(), TableConfig::default()).unwrap();
        assert_eq!(table.rows()[0].id, ListingId::String("-12".to_string()));
        assert_eq!(table.rows()[1].id, ListingId::Integer(7));
    }

    #[test]
    fn test_read_json() {
        let data = r#"[
            {"property_id": "abc", "price": 10.0, "neighborhood": "Roma"},
            {"property_id": 7, "price": null}
        ]"#;
        let table = read_json(data.as_bytes(), TableConfig::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get(&ListingId::String("abc".into())).is_some());
        assert_eq!(table.get(&ListingId::Integer(7)).unwrap().number("price"), None);

        assert!(matches!(
            read_json(r#"{"property_id": 1}"#.as_bytes(), TableConfig::default()),
            Err(StorageError::InvalidDataset(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "property_id,price\n1,10\n2,20").unwrap();

        let table = load(&path, TableConfig::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(), "listings");

        let other = dir.path().join("listings.parquet");
        assert!(matches!(
            load(&other, TableConfig::default()),
            Err(StorageError::UnsupportedFormat(_))
        ));
    }
}
