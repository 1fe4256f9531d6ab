//! Error types for the scanner

use thiserror::Error;

use crate::dataset::DatasetId;

/// Errors surfaced by identity-keyed operations and configuration.
///
/// Detection misses are not errors: detectors return `None` and the scan
/// moves on.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The registry holds no dataset under this id
    #[error("Dataset {0} not found. Rescan the page.")]
    DatasetNotFound(DatasetId),

    /// The caller holds a token from an earlier scan
    #[error("Dataset {id} belongs to scan {requested}, current scan is {current}. Rescan the page.")]
    StaleScan {
        id: DatasetId,
        requested: u64,
        current: u64,
    },

    /// Export format outside {csv, json}
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    /// Nothing on the page looks like a pagination control
    #[error("No next or load more button found.")]
    NoNextControl,

    /// `autoScroll` reached a dispatcher with no page to scroll
    #[error("Auto-scroll needs a scrollable page.")]
    NoScrollSurface,

    /// Request JSON could not be understood
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("Serialize error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        ScanError::Serialize(e.to_string())
    }
}

impl From<toml::de::Error> for ScanError {
    fn from(e: toml::de::Error) -> Self {
        ScanError::Config(e.to_string())
    }
}
