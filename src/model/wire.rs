// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lenient serde helpers for the catalog wire format.
//!
//! The public service is sloppy about optional fields: URLs arrive as null,
//! the empty string, or occasionally garbage, and release timestamps come in
//! several shapes. Anything unusable maps to `None` instead of failing the
//! whole response.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use url::Url;

/// Serde adapter for `Option<Url>` fields on catalog entities
pub(crate) mod lenient_url {
    use serde::{Deserialize, Deserializer, Serializer};
    use url::Url;

    pub fn serialize<S>(value: &Option<Url>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(url) => serializer.serialize_str(url.as_str()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_url))
    }
}

/// Serde adapter for `Option<DateTime<Utc>>` release timestamps
pub(crate) mod lenient_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => serializer.serialize_str(&timestamp.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_release_date))
    }
}

/// Parse a URL the way the catalog emits them: null, the empty string, and
/// unparseable values all mean "no URL"
pub(crate) fn parse_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Url::parse(trimmed).ok()
}

/// Try the timestamp shapes seen in catalog responses, strictest first
pub(crate) fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.with_timezone(&Utc));
    }

    // Naive datetimes are treated as UTC
    let naive_formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for format in naive_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}

/// Sentinel for counts the service has not reported
pub(crate) fn unreported_count() -> i64 {
    -1
}
