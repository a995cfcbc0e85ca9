mod batch;
mod device;
mod episode;
mod filename;
mod subscription;
mod wire;

pub use batch::UpdateBatch;
pub use device::{Device, DeviceKind};
pub use episode::{Episode, EpisodeStatus};
pub use filename::filename_stem;
pub use subscription::Subscription;
