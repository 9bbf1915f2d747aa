//! RSS path: the channel's Atom feed, validated then parsed entry by entry.
//!
//! The feed is channel-scoped only. No keyword filtering happens here; see
//! [`crate::source::VideoBatch::retain_matching`] for callers that want it.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::query::ChannelHandleQuery;

use super::http_client::{HttpSettings, build_source_http_client, join_base};
use super::{SourceError, SourceKind, VideoBatch, VideoRecord, VideoSource};

/// Default feed host.
const DEFAULT_FEED_BASE_URL: &str = "https://www.youtube.com";

const FEED_PATH: &str = "feeds/videos.xml";

/// Fetches a channel's Atom feed.
pub struct RssSource {
    client: Client,
    base_url: String,
}

impl RssSource {
    /// Creates a source against the default feed host.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::HttpClient`] when client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_FEED_BASE_URL, settings)
    }

    /// Creates a source with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::HttpClient`] when client construction fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_source_http_client("rss", settings)?,
            base_url: base_url.into(),
        })
    }

    /// Fetches and parses the feed for `handle`.
    ///
    /// Whitespace is stripped from the handle before it is sent.
    ///
    /// # Errors
    ///
    /// [`SourceError::Network`] when the feed cannot be fetched,
    /// [`SourceError::InvalidXml`] when it is not well-formed, and
    /// [`SourceError::FeedProcessing`] for anything else.
    #[tracing::instrument(skip(self), fields(source = "rss"))]
    pub async fn fetch_videos(&self, handle: &str) -> Result<Vec<VideoRecord>, SourceError> {
        let user: String = handle.chars().filter(|c| !c.is_whitespace()).collect();
        let url = Url::parse_with_params(&join_base(&self.base_url, FEED_PATH), &[("user", &user)])
            .map_err(|e| SourceError::invalid_url(&self.base_url, &e))?;

        debug!(feed_url = %url, "Fetching channel feed");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Feed request failed");
            SourceError::transport(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error = SourceError::http_status(status.as_u16());
            warn!(status = status.as_u16(), error = %error, "Feed fetch error");
            return Err(error);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::feed_processing(format!("failed to read feed body: {e}")))?;
        let videos = parse_feed(&bytes)?;
        debug!(count = videos.len(), "Parsed feed entries");
        Ok(videos)
    }
}

impl std::fmt::Debug for RssSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RssSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VideoSource for RssSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Rss
    }

    async fn discover(&self, query: &ChannelHandleQuery) -> Result<VideoBatch, SourceError> {
        let videos = self.fetch_videos(query.channel_handle()).await?;
        Ok(VideoBatch::new(SourceKind::Rss, videos))
    }
}

// ==================== Validation ====================

/// Checks that `xml` is a well-formed document with exactly one root element.
///
/// # Errors
///
/// Returns [`SourceError::InvalidXml`] describing the first structural problem.
pub fn validate_feed_xml(xml: &[u8]) -> Result<(), SourceError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut root_seen = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    if root_seen {
                        return Err(SourceError::invalid_xml("multiple root elements"));
                    }
                    root_seen = true;
                }
                depth += 1;
            }
            Ok(Event::Empty(_)) => {
                if depth == 0 {
                    if root_seen {
                        return Err(SourceError::invalid_xml("multiple root elements"));
                    }
                    root_seen = true;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SourceError::invalid_xml("unexpected closing tag"))?;
            }
            Ok(Event::Text(_) | Event::CData(_)) if depth == 0 => {
                return Err(SourceError::invalid_xml("text outside the root element"));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SourceError::invalid_xml(format!(
                    "{e} at byte {}",
                    reader.error_position()
                )));
            }
            Ok(_) => {}
        }
        buf.clear();
    }

    if !root_seen {
        return Err(SourceError::invalid_xml("document has no root element"));
    }
    if depth != 0 {
        return Err(SourceError::invalid_xml(format!(
            "{depth} unclosed element(s) at end of document"
        )));
    }
    Ok(())
}

// ==================== Parsing ====================

/// Converts an Atom feed into video records.
///
/// Entries without `yt:videoId`, `title` or a parseable `published` date are
/// dropped and logged; the rest of the batch is kept.
///
/// # Errors
///
/// Returns [`SourceError::InvalidXml`] when the feed fails validation and
/// [`SourceError::FeedProcessing`] when the reader fails mid-document. Entry
/// text with an unknown entity is kept verbatim rather than failing the batch.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<VideoRecord>, SourceError> {
    validate_feed_xml(xml)?;

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut videos = Vec::new();
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<(usize, EntryBuilder)> = None;
    let mut entry_index = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                path.push(name);
                if current.is_none() && path.last().is_some_and(|n| n == "entry") {
                    current = Some((path.len(), EntryBuilder::default()));
                } else if let Some((entry_depth, entry)) = current.as_mut() {
                    entry.observe_element(&path[*entry_depth..], &e);
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some((entry_depth, entry)) = current.as_mut() {
                    path.push(element_name(&e));
                    entry.observe_element(&path[*entry_depth..], &e);
                    path.pop();
                }
            }
            Ok(Event::End(_)) => {
                let closes_entry = current
                    .as_ref()
                    .is_some_and(|(entry_depth, _)| path.len() == *entry_depth);
                if closes_entry && let Some((_, entry)) = current.take() {
                    match entry.build() {
                        Ok(record) => videos.push(record),
                        Err(reason) => warn!(index = entry_index, reason, "Dropping feed entry"),
                    }
                    entry_index += 1;
                }
                path.pop();
            }
            Ok(Event::Text(e)) => {
                if let Some((entry_depth, entry)) = current.as_mut() {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(error) => {
                            warn!(
                                index = entry_index,
                                error = %error,
                                "Keeping undecodable feed text as-is"
                            );
                            String::from_utf8_lossy(&e).into_owned()
                        }
                    };
                    entry.push_text(&path[*entry_depth..], &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some((entry_depth, entry)) = current.as_mut() {
                    let raw = e.into_inner();
                    entry.push_text(&path[*entry_depth..], &String::from_utf8_lossy(&raw));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::feed_processing(e)),
            Ok(_) => {}
        }
        buf.clear();
    }

    Ok(videos)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Fields collected for one `<entry>`; paths are relative to the entry.
#[derive(Debug, Default)]
struct EntryBuilder {
    video_id: Option<String>,
    title: Option<String>,
    published: Option<String>,
    description: Option<String>,
    thumbnail_url: Option<String>,
}

impl EntryBuilder {
    fn observe_element(&mut self, relative_path: &[String], e: &BytesStart<'_>) {
        if self.thumbnail_url.is_some() || !path_is(relative_path, &["media:group", "media:thumbnail"])
        {
            return;
        }
        self.thumbnail_url = e
            .attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == b"url")
            .and_then(|attr| attr.unescape_value().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    fn push_text(&mut self, relative_path: &[String], text: &str) {
        let field = if path_is(relative_path, &["yt:videoId"]) {
            &mut self.video_id
        } else if path_is(relative_path, &["title"]) {
            &mut self.title
        } else if path_is(relative_path, &["published"]) {
            &mut self.published
        } else if path_is(relative_path, &["media:group", "media:description"]) {
            &mut self.description
        } else {
            return;
        };
        field.get_or_insert_with(String::new).push_str(text);
    }

    fn build(self) -> Result<VideoRecord, &'static str> {
        let published = self
            .published
            .as_deref()
            .ok_or("missing published date")?;
        let published_at = parse_published(published).ok_or("unparseable published date")?;

        VideoRecord::try_new(
            self.video_id.unwrap_or_default(),
            self.title.unwrap_or_default(),
            self.description.unwrap_or_default(),
            self.thumbnail_url.unwrap_or_default(),
            Some(published_at),
        )
        .ok_or("missing yt:videoId or title")
    }
}

fn path_is(relative_path: &[String], expected: &[&str]) -> bool {
    relative_path.len() == expected.len()
        && relative_path
            .iter()
            .zip(expected)
            .all(|(actual, expected)| actual == expected)
}

/// Parses an ISO-8601-like timestamp; offset-less values are taken as UTC.
#[must_use]
pub(crate) fn parse_published(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}
