use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the storm impact pipeline.
#[derive(Error, Debug)]
pub enum StormError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV row could not be parsed into a raw record.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A begin date did not match any recognised format.
    #[error("Invalid date {value:?} on record {record_id}")]
    DateParse { record_id: String, value: String },

    /// A record identifier was empty or not a whole number.
    #[error("Invalid record id: {0:?}")]
    RecordId(String),

    /// The data file parsed cleanly but contained no rows.
    #[error("No records found in {0}")]
    EmptyDataset(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A report could not be serialised to JSON.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the storm impact crates.
pub type Result<T> = std::result::Result<T, StormError>;
