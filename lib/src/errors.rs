//! Error types used by this lib.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Anonymity epoch length must be positive, got {0}")]
    NonPositiveEpochLength(f64),
    #[error("Window length must be positive, got {0}")]
    NonPositiveWindowLength(f64),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error reading capture file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed capture row: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid hex in field '{field}': {source}")]
    Hex {
        field: &'static str,
        source: hex::FromHexError,
    },
    #[error("Invalid radio address '{0}': expected 6 colon-separated octets")]
    MacFormat(String),
    #[error("Public key field must be 28 bytes, got {0}")]
    KeyLength(usize),
    #[error("Capture rows not sorted by timestamp (row {index})")]
    UnsortedTimestamps { index: usize },
}
