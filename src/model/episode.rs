use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::filename::filename_stem;
use super::wire;

/// Playback state of an episode, as tracked by the catalog.
///
/// The four states are exhaustive: `Delete` marks an episode for removal
/// during reconciliation, the other three all mean "keep/refresh". The
/// public service emits lowercase action names, older clients PascalCase;
/// both deserialize, PascalCase is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpisodeStatus {
    #[default]
    #[serde(alias = "new")]
    New,
    #[serde(alias = "play")]
    Play,
    #[serde(alias = "download")]
    Download,
    #[serde(alias = "delete")]
    Delete,
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EpisodeStatus::New => "new",
            EpisodeStatus::Play => "play",
            EpisodeStatus::Download => "download",
            EpisodeStatus::Delete => "delete",
        };
        write!(f, "{}", label)
    }
}

/// A single episode of a subscribed feed.
///
/// The url is the natural key. `podcast_title` links the episode to its
/// subscription; episodes whose title resolves to no held subscription stay
/// in the flat collection without being exposed through the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    #[serde(
        default,
        with = "wire::lenient_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<Url>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub podcast_title: String,
    #[serde(
        default,
        with = "wire::lenient_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub podcast_url: Option<Url>,
    /// Raw description as delivered; may contain HTML entities
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        with = "wire::lenient_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<Url>,
    #[serde(
        default,
        with = "wire::lenient_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub mygpo_link: Option<Url>,
    #[serde(
        default,
        with = "wire::lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub released: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: EpisodeStatus,
    /// Playback position in milliseconds; local bookkeeping, defaults to 0
    #[serde(default)]
    pub position_ms: i64,
    /// Total duration in milliseconds; local bookkeeping, defaults to 0
    #[serde(default)]
    pub duration_ms: i64,
}

impl Episode {
    /// Episode description with HTML entities decoded
    pub fn description_text(&self) -> String {
        html_escape::decode_html_entities(&self.description).into_owned()
    }

    /// Storage-safe stem derived from the title
    pub fn filename_stem(&self) -> String {
        filename_stem(&self.title)
    }
}

impl PartialEq for Episode {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Episode {}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
