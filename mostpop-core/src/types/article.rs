//! Article models matching the Most Popular wire schema.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::constants::{BYLINE_PREFIX, DETAIL_IMAGE_FORMAT};

/// One emission of a result stream: the ranked articles of a response.
pub type ResultBatch = Vec<Article>;

/// Decoded body of a Most Popular response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArticleApiResponse {
    /// Service status string (e.g. "OK").
    pub status: String,
    /// Number of results reported by the service.
    pub num_results: u32,
    /// Ranked articles.
    pub results: Vec<Article>,
}

impl ArticleApiResponse {
    /// Wraps a list of articles in an "OK" response.
    pub fn ok(results: Vec<Article>) -> Self {
        Self {
            status: "OK".into(),
            num_results: results.len() as u32,
            results,
        }
    }
}

/// A ranked article.
///
/// Equality and hashing use the stable `id` only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Article {
    /// Stable article identity.
    pub id: u64,
    /// Canonical article URL.
    pub url: String,
    /// Publication date as sent by the service.
    pub published_date: String,
    /// Byline, usually already starting with "By".
    pub byline: String,
    /// Headline.
    pub title: String,
    /// Summary.
    #[serde(rename = "abstract")]
    pub summary: String,
    /// Attached media.
    #[serde(default)]
    pub media: Vec<Media>,
    /// Section the article belongs to.
    pub section: String,
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Article {
    /// URL of the first media rendition with the given format.
    pub fn image_url(&self, format: &str) -> Option<&str> {
        self.media
            .first()?
            .media_metadata
            .iter()
            .find(|m| m.format == format)
            .map(|m| m.url.as_str())
    }

    /// URL of the rendition used on article detail screens.
    pub fn detail_image_url(&self) -> Option<&str> {
        self.image_url(DETAIL_IMAGE_FORMAT)
    }

    /// Byline ready for display.
    pub fn byline_text(&self) -> String {
        if self.byline.starts_with(BYLINE_PREFIX) {
            self.byline.clone()
        } else {
            format!("{}{}", BYLINE_PREFIX, self.byline)
        }
    }
}

/// Media attached to an article.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Media {
    /// Media type (e.g. "image").
    #[serde(rename = "type")]
    pub kind: String,
    /// Caption text.
    #[serde(default)]
    pub caption: String,
    /// Available renditions.
    #[serde(rename = "media-metadata", default)]
    pub media_metadata: Vec<MediaMetadata>,
}

/// One rendition of a media item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Rendition URL.
    pub url: String,
    /// Rendition format name.
    pub format: String,
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
}
