use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the catalog service
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse catalog response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Top-level errors for reconciliation operations
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No identity configured")]
    Unauthenticated,

    #[error("No device selected")]
    NoDeviceSelected,

    #[error("Catalog error: {0}")]
    Remote(#[from] GatewayError),
}

/// Errors that can occur when loading or storing state snapshots
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot JSON in {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    JsonSerializeFailed(#[from] serde_json::Error),
}
