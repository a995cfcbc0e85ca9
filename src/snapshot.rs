use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::model::{Device, Episode, Subscription};

/// Persisted engine state between runs.
///
/// The real persistence layer is an external collaborator driven by change
/// events; this is the bulk shape it hands back on startup, and what the
/// CLI writes to its state file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_device_id: Option<String>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
    #[serde(default)]
    pub watermark: i64,
}

/// Read a snapshot from a JSON file
pub fn read_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| SnapshotError::JsonParseFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a snapshot to a JSON file
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).map_err(|e| SnapshotError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
