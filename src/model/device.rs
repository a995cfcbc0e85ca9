use std::fmt;

use serde::{Deserialize, Serialize};

use super::wire;

/// The reported form factor of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Desktop,
    Laptop,
    Mobile,
    Server,
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeviceKind::Desktop => "desktop",
            DeviceKind::Laptop => "laptop",
            DeviceKind::Mobile => "mobile",
            DeviceKind::Server => "server",
            DeviceKind::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// A client device registered with the catalog account.
///
/// The device set is always a verbatim mirror of the last full fetch; it is
/// never merged incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Natural key; equality is by id alone
    pub id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(rename = "type", default)]
    pub kind: DeviceKind,
    /// Informational subscription count, -1 when the service omitted it
    #[serde(default = "wire::unreported_count")]
    pub subscriptions: i64,
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Device {}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.caption)
    }
}
