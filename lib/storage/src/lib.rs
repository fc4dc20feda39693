pub mod dataset;
pub mod error;
pub mod report;

pub use dataset::{load, load_csv, load_json, parse_cell, read_csv, read_json, Format};
pub use error::{Result, StorageError};
pub use report::{write_atomic, write_json, write_leaderboard, write_results};
