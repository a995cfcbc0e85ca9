pub mod engine;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod model;
pub mod notify;
pub mod snapshot;

// Re-export main types for convenience
pub use engine::{EngineOptions, SyncEngine};
pub use error::{GatewayError, SnapshotError, SyncError};
pub use gateway::{DEFAULT_BASE_URL, Gateway, HttpGateway};
pub use identity::Identity;
pub use model::{
    Device, DeviceKind, Episode, EpisodeStatus, Subscription, UpdateBatch, filename_stem,
};
pub use notify::{Channel, Listener, ListenerResult, LogChannel, LogListener, Notifier, listener};
pub use snapshot::{Snapshot, read_snapshot, write_snapshot};
