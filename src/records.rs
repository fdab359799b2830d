use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single URL extracted from the chat export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// 1-based identifier, assigned in input order
    pub id: u32,

    /// Date of the message the URL was found in (opaque, passed through)
    pub date: String,

    /// The URL itself
    pub url: String,
}

impl UrlRecord {
    /// Create a new URL record
    pub fn new(id: u32, date: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            date: date.into(),
            url: url.into(),
        }
    }
}

/// Preview metadata fetched for a URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Page title
    #[serde(default)]
    pub title: String,

    /// Page description
    #[serde(default)]
    pub description: String,

    /// Open Graph meta tags, keyed without the `og:` prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_meta: Option<BTreeMap<String, String>>,

    /// Twitter card meta tags, keyed without the `twitter:` prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_meta: Option<BTreeMap<String, String>>,
}

impl Preview {
    /// A preview with no title, description, or social-card metadata is
    /// useless to consumers and is never cached or emitted.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.og_meta.as_ref().is_none_or(|m| m.is_empty())
            && self.twitter_meta.as_ref().is_none_or(|m| m.is_empty())
    }
}

/// One entry of the enriched output file.
///
/// The preview is kept as a raw JSON value so that entries loaded back
/// from an earlier run pass through byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewOutput {
    pub id: u32,
    pub date: String,
    pub url: String,
    pub preview: Value,
}
