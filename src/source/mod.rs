//! Video source paths and the uniform record they normalize into.
//!
//! Three independent source paths each fetch a channel's videos and convert
//! their own upstream shape into [`VideoRecord`]s:
//!
//! - [`OfficialApiSource`] - paginated official search API (first page only),
//!   scoped by a channel id resolved through [`ChannelResolver`]
//! - [`InternalApiSource`] - undocumented internal browse endpoint returning
//!   deeply nested JSON
//! - [`RssSource`] - the channel's Atom feed (no keyword filtering)
//!
//! There is no fallback chain: callers pick the path they want, either
//! directly or through [`crate::scout::VideoScout`].
//!
//! # Example
//!
//! ```no_run
//! use vidscout_core::source::{HttpSettings, RssSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rss = RssSource::new(HttpSettings::default())?;
//! for video in rss.fetch_videos("SomeChannel").await? {
//!     println!("{} {}", video.external_id, video.title);
//! }
//! # Ok(())
//! # }
//! ```

mod channel;
mod error;
mod http_client;
mod internal;
mod official;
mod rss;
mod thumbnails;

pub use channel::{ChannelResolver, ResolvedChannel};
pub use error::SourceError;
pub use http_client::{HttpSettings, build_source_http_client};
pub use internal::{DEFAULT_BROWSE_ID, InternalApiSource, parse_internal_browse};
pub use official::{OFFICIAL_PAGE_SIZE, OfficialApiSource, parse_official_search};
pub use rss::{RssSource, parse_feed, validate_feed_xml};
pub use thumbnails::{Thumbnail, ThumbnailSet, select_thumbnail};

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::query::{ChannelHandleQuery, matches_keywords};

/// The unified video shape produced by every source parser.
///
/// Source parsers build records through [`VideoRecord::try_new`], the
/// validating constructor, which rejects a blank id or title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Upstream video id.
    pub external_id: String,
    /// Plain-text title.
    pub title: String,
    /// Plain-text description; empty when the source omits it.
    pub description: String,
    /// Absolute thumbnail URL; empty when the source offers none.
    pub thumbnail_url: String,
    /// Publication time, only from sources that expose it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl VideoRecord {
    /// Builds a record, or `None` when the id or title is blank.
    #[must_use]
    pub fn try_new(
        external_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        thumbnail_url: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        let external_id = external_id.into().trim().to_string();
        let title = title.into().trim().to_string();
        if external_id.is_empty() || title.is_empty() {
            return None;
        }
        Some(Self {
            external_id,
            title,
            description: description.into(),
            thumbnail_url: thumbnail_url.into(),
            published_at,
        })
    }
}

/// Which source path produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    /// Official search API.
    OfficialApi,
    /// Internal browse endpoint.
    InternalApi,
    /// Atom feed.
    Rss,
}

impl SourceKind {
    /// Returns the stable short label for the source.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OfficialApi => "official",
            Self::InternalApi => "internal",
            Self::Rss => "rss",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Videos from one source for one channel.
///
/// Channel fields live here rather than on each record because a query
/// targets exactly one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoBatch {
    /// The path that produced the videos.
    pub source: SourceKind,
    /// Resolved channel id, when the path resolves one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Channel avatar, when the path resolves one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_avatar_url: Option<String>,
    /// Normalized videos.
    pub videos: Vec<VideoRecord>,
}

impl VideoBatch {
    /// Creates a batch with no channel details.
    #[must_use]
    pub fn new(source: SourceKind, videos: Vec<VideoRecord>) -> Self {
        Self {
            source,
            channel_id: None,
            channel_avatar_url: None,
            videos,
        }
    }

    /// Attaches resolved channel details.
    #[must_use]
    pub fn with_channel(mut self, channel: ResolvedChannel) -> Self {
        self.channel_id = Some(channel.channel_id);
        self.channel_avatar_url = Some(channel.channel_avatar_url);
        self
    }

    /// Drops videos whose title and description match none of `keywords`.
    pub fn retain_matching(&mut self, keywords: &str) {
        self.videos.retain(|video| matches_keywords(video, keywords));
    }
}

/// A source path the scout can dispatch to.
///
/// # Object Safety
///
/// This trait uses `async_trait` so sources can be held as
/// `Box<dyn VideoSource>`.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Returns which path this source implements.
    fn kind(&self) -> SourceKind;

    /// Fetches and normalizes the videos for a validated query.
    async fn discover(&self, query: &ChannelHandleQuery) -> Result<VideoBatch, SourceError>;
}

/// Routes a raw payload to the parser for `kind`.
///
/// # Errors
///
/// Returns the parser's typed failure: [`SourceError::JsonParse`] for the
/// JSON sources, [`SourceError::InvalidXml`] or
/// [`SourceError::FeedProcessing`] for the feed.
pub fn parse_payload(kind: SourceKind, body: &[u8]) -> Result<Vec<VideoRecord>, SourceError> {
    match kind {
        SourceKind::OfficialApi => parse_official_search(body),
        SourceKind::InternalApi => parse_internal_browse(body),
        SourceKind::Rss => parse_feed(body),
    }
}
