//! Thumbnail selection policy shared by channel avatars and official search results.

use serde::Deserialize;

/// One sized thumbnail entry from the official API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    /// Image URL; absent or empty when the size is not offered.
    pub url: Option<String>,
}

/// The sized thumbnails the official API offers for a channel or video.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailSet {
    /// Lowest resolution.
    pub default: Option<Thumbnail>,
    /// Middle resolution.
    pub medium: Option<Thumbnail>,
    /// Highest resolution.
    pub high: Option<Thumbnail>,
}

/// Picks the highest-resolution non-empty URL: `high`, then `medium`, then `default`.
///
/// A lone low-resolution entry is used rather than failing.
#[must_use]
pub fn select_thumbnail(set: &ThumbnailSet) -> Option<String> {
    [&set.high, &set.medium, &set.default]
        .into_iter()
        .filter_map(|entry| entry.as_ref().and_then(|thumb| thumb.url.as_deref()))
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
}
