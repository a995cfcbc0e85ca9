use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::filename::filename_stem;
use super::wire;

/// A podcast feed the account subscribes to.
///
/// The title is the natural key: equality, episode linking, and removal
/// references all resolve by title. Episodes are not owned here; the engine
/// maintains the title-to-episodes index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        with = "wire::lenient_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<Url>,
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
        with = "wire::lenient_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub logo_url: Option<Url>,
    #[serde(
        default,
        with = "wire::lenient_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub scaled_logo_url: Option<Url>,
    /// Raw description as delivered; may contain HTML entities
    #[serde(default)]
    pub description: String,
    #[serde(default = "wire::unreported_count")]
    pub subscribers: i64,
    #[serde(default = "wire::unreported_count")]
    pub subscribers_last_week: i64,
    #[serde(default = "wire::unreported_count")]
    pub position_last_week: i64,
}

impl Subscription {
    /// Feed description with HTML entities decoded
    pub fn description_text(&self) -> String {
        html_escape::decode_html_entities(&self.description).into_owned()
    }

    /// Storage-safe stem derived from the title
    pub fn filename_stem(&self) -> String {
        filename_stem(&self.title)
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for Subscription {}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_subscription(title: &str) -> Subscription {
        Subscription {
            title: title.to_string(),
            url: None,
            website: None,
            mygpo_link: None,
            logo_url: None,
            scaled_logo_url: None,
            description: String::new(),
            subscribers: -1,
            subscribers_last_week: -1,
            position_last_week: -1,
        }
    }

    #[test]
    fn equality_is_by_title_only() {
        let mut one = make_subscription("Linux Weekly");
        one.subscribers = 100;
        let other = make_subscription("Linux Weekly");

        assert_eq!(one, other);
        assert_ne!(one, make_subscription("Linux Daily"));
    }

    #[test]
    fn deserializes_wire_shape() {
        let subscription: Subscription = serde_json::from_str(
            r#"{
                "title": "Linux Weekly",
                "url": "https://example.com/feed.xml",
                "website": "https://example.com",
                "mygpo_link": "https://gpodder.net/podcast/1",
                "logo_url": "https://example.com/logo.png",
                "scaled_logo_url": "https://example.com/logo-64.png",
                "description": "A show about Linux",
                "subscribers": 1200,
                "subscribers_last_week": 1100,
                "position_last_week": 9
            }"#,
        )
        .unwrap();

        assert_eq!(subscription.title, "Linux Weekly");
        assert_eq!(
            subscription.url.as_ref().map(Url::as_str),
            Some("https://example.com/feed.xml")
        );
        assert_eq!(subscription.subscribers, 1200);
        assert_eq!(subscription.position_last_week, 9);
    }

    #[test]
    fn empty_and_null_urls_become_none() {
        let subscription: Subscription = serde_json::from_str(
            r#"{"title": "Sparse", "url": "", "logo_url": null, "website": "not a url"}"#,
        )
        .unwrap();

        assert!(subscription.url.is_none());
        assert!(subscription.logo_url.is_none());
        assert!(subscription.website.is_none());
    }

    #[test]
    fn missing_counts_default_to_sentinel() {
        let subscription: Subscription = serde_json::from_str(r#"{"title": "Sparse"}"#).unwrap();
        assert_eq!(subscription.subscribers, -1);
        assert_eq!(subscription.subscribers_last_week, -1);
        assert_eq!(subscription.position_last_week, -1);
    }

    #[test]
    fn description_text_decodes_entities() {
        let mut subscription = make_subscription("Show");
        subscription.description = "News &amp; reviews &lt;weekly&gt;".to_string();
        assert_eq!(subscription.description_text(), "News & reviews <weekly>");
    }

    #[test]
    fn filename_stem_derives_from_title() {
        let subscription = make_subscription("Linux Weekly News!");
        assert_eq!(subscription.filename_stem(), "linux-weekly-news");
    }
}
