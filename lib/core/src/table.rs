use crate::listing::{is_missing, Listing, ListingId};
use crate::{Error, Filter, Result};
use ahash::AHashSet;
use serde_json::{Map, Value};

pub const DEFAULT_ID_COLUMN: &str = "property_id";

/// Configuration for a listings table
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub name: String,
    /// Column holding the unique listing identifier
    pub id_column: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
        }
    }
}

/// An in-memory, already cleaned table of listings.
///
/// Rows keep their insertion order, which is the tie-break order for equal
/// scores. The table is never mutated by ranking calls.
#[derive(Debug, Clone, Default)]
pub struct ListingTable {
    config: TableConfig,
    rows: Vec<Listing>,
    columns: AHashSet<String>,
}

impl ListingTable {
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            rows: Vec::new(),
            columns: AHashSet::new(),
        }
    }

    pub fn from_listings(config: TableConfig, listings: Vec<Listing>) -> Self {
        let mut table = Self::new(config);
        table.extend(listings);
        table
    }

    /// Build a table from JSON objects, taking the id from the configured id column
    pub fn from_records(config: TableConfig, records: Vec<Map<String, Value>>) -> Result<Self> {
        let mut table = Self::new(config);
        for (index, mut record) in records.into_iter().enumerate() {
            let id = record
                .remove(&table.config.id_column)
                .as_ref()
                .and_then(ListingId::from_value)
                .ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "row {} has no usable '{}' value",
                        index, table.config.id_column
                    ))
                })?;
            record.retain(|_, v| !is_missing(v));
            table.push(Listing::new(id, record));
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn id_column(&self) -> &str {
        &self.config.id_column
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, listing: Listing) {
        for key in listing.payload.keys() {
            if !self.columns.contains(key) {
                self.columns.insert(key.clone());
            }
        }
        self.rows.push(listing);
    }

    pub fn extend(&mut self, listings: impl IntoIterator<Item = Listing>) {
        for listing in listings {
            self.push(listing);
        }
    }

    pub fn rows(&self) -> &[Listing] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.rows.iter()
    }

    pub fn get(&self, id: &ListingId) -> Option<&Listing> {
        self.rows.iter().find(|l| &l.id == id)
    }

    /// True when at least one row carries the column
    pub fn has_column(&self, column: &str) -> bool {
        column == self.config.id_column || self.columns.contains(column)
    }

    /// Sorted column names, id column excluded
    pub fn columns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Fails with the first feature no row carries
    pub fn require_columns(&self, features: &[String]) -> Result<()> {
        match features.iter().find(|f| !self.has_column(f)) {
            Some(missing) => Err(Error::MissingFeature(missing.clone())),
            None => Ok(()),
        }
    }

    /// Rows matching a filter, in table order
    pub fn select<'a>(&'a self, filter: &'a dyn Filter) -> impl Iterator<Item = &'a Listing> + 'a {
        self.rows.iter().filter(move |l| filter.matches(l))
    }

    /// Mean coordinates of the rows in a neighborhood that have both coordinates
    pub fn neighborhood_centroid(&self, neighborhood: &str) -> Option<(f64, f64)> {
        let (mut lat_sum, mut lon_sum, mut count) = (0.0, 0.0, 0usize);
        for (lat, lon) in self
            .rows
            .iter()
            .filter(|l| l.neighborhood() == Some(neighborhood))
            .filter_map(Listing::coordinates)
        {
            lat_sum += lat;
            lon_sum += lon;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some((lat_sum / count as f64, lon_sum / count as f64))
        }
    }
}

impl<'a> IntoIterator for &'a ListingTable {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
