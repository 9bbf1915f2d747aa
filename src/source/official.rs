//! Official-API search path: one page of keyword results scoped to a channel id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::query::ChannelHandleQuery;

use super::channel::ChannelResolver;
use super::http_client::{HttpSettings, build_source_http_client, join_base};
use super::thumbnails::{ThumbnailSet, select_thumbnail};
use super::{SourceError, SourceKind, VideoBatch, VideoRecord, VideoSource};

/// Default official API base URL.
pub(crate) const DEFAULT_OFFICIAL_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Results requested per search; only the first page is fetched.
pub const OFFICIAL_PAGE_SIZE: u8 = 10;

/// Error reasons that signal quota or key exhaustion regardless of HTTP status.
const QUOTA_REASONS: [&str; 3] = ["quotaExceeded", "dailyLimitExceeded", "rateLimitExceeded"];

// ==================== Official API Response Types ====================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
    snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    thumbnails: ThumbnailSet,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

// ==================== OfficialApiSource ====================

/// Searches a channel's videos through the official API.
pub struct OfficialApiSource {
    client: Client,
    base_url: String,
    api_key: String,
    resolver: ChannelResolver,
}

impl OfficialApiSource {
    /// Creates a source against the default official API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingApiKey`] for a blank key, or
    /// [`SourceError::HttpClient`] when client construction fails.
    pub fn new(api_key: impl Into<String>, settings: HttpSettings) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, DEFAULT_OFFICIAL_BASE_URL, settings)
    }

    /// Creates a source with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`OfficialApiSource::new`].
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, SourceError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(SourceError::MissingApiKey);
        }
        let base_url = base_url.into();
        let client = build_source_http_client("official", settings)?;
        let resolver = ChannelResolver::from_parts(client.clone(), base_url.clone(), api_key.clone());

        Ok(Self {
            client,
            base_url,
            api_key,
            resolver,
        })
    }

    /// The channel resolver sharing this source's client and key.
    #[must_use]
    pub fn resolver(&self) -> &ChannelResolver {
        &self.resolver
    }

    /// Fetches the first page of videos matching `keywords` in `channel_id`.
    ///
    /// # Errors
    ///
    /// [`SourceError::ChannelNotFound`] on HTTP 404, [`SourceError::QuotaExceeded`]
    /// on HTTP 403 or a quota reason, [`SourceError::Upstream`] for other
    /// failures, [`SourceError::Network`] when the API cannot be reached and
    /// [`SourceError::JsonParse`] for an unreadable body.
    #[tracing::instrument(skip(self), fields(source = "official"))]
    pub async fn fetch_videos(
        &self,
        channel_id: &str,
        keywords: &str,
    ) -> Result<Vec<VideoRecord>, SourceError> {
        let page_size = OFFICIAL_PAGE_SIZE.to_string();
        let url = Url::parse_with_params(
            &join_base(&self.base_url, "search"),
            &[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("q", keywords),
                ("type", "video"),
                ("maxResults", page_size.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| SourceError::invalid_url(&self.base_url, &e))?;

        debug!("Calling official search API");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Official search request failed");
            SourceError::transport(&e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| SourceError::transport(&e))?;

        if !(200..300).contains(&status) {
            let error = classify_failure(status, &body, channel_id);
            warn!(status, error = %error, "Official search API error");
            return Err(error);
        }

        let videos = parse_official_search(body.as_bytes())?;
        debug!(count = videos.len(), "Parsed official search results");
        Ok(videos)
    }
}

impl std::fmt::Debug for OfficialApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfficialApiSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VideoSource for OfficialApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::OfficialApi
    }

    async fn discover(&self, query: &ChannelHandleQuery) -> Result<VideoBatch, SourceError> {
        let channel = self.resolver.resolve_channel(query.channel_handle()).await?;
        let videos = self
            .fetch_videos(&channel.channel_id, query.keywords())
            .await?;
        Ok(VideoBatch::new(SourceKind::OfficialApi, videos).with_channel(channel))
    }
}

// ==================== Parsing ====================

/// Converts an official search response body into video records.
///
/// Items without a video id, a snippet or a title are dropped.
///
/// # Errors
///
/// Returns [`SourceError::JsonParse`] when the body is not a JSON object
/// with an optional `items` array.
pub fn parse_official_search(body: &[u8]) -> Result<Vec<VideoRecord>, SourceError> {
    let response: SearchResponse = serde_json::from_slice(body).map_err(SourceError::json_parse)?;

    let mut videos = Vec::with_capacity(response.items.len());
    for (index, raw_item) in response.items.into_iter().enumerate() {
        match search_item_to_record(raw_item) {
            Some(record) => videos.push(record),
            None => warn!(index, "Dropping official search item without video id or title"),
        }
    }
    Ok(videos)
}

fn search_item_to_record(raw_item: serde_json::Value) -> Option<VideoRecord> {
    let item: SearchItem = serde_json::from_value(raw_item).ok()?;
    let video_id = item.id?.video_id?;
    let snippet = item.snippet?;

    let published_at = snippet
        .published_at
        .as_deref()
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.with_timezone(&Utc));

    VideoRecord::try_new(
        video_id,
        snippet.title?,
        snippet.description.unwrap_or_default(),
        select_thumbnail(&snippet.thumbnails).unwrap_or_default(),
        published_at,
    )
}

/// Maps a non-success official API response to a typed error.
///
/// `subject` is the handle or channel id reported on 404.
pub(crate) fn classify_failure(status: u16, body: &str, subject: &str) -> SourceError {
    let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error.unwrap_or_default();
    let quota_signal = error.errors.iter().any(|detail| {
        detail
            .reason
            .as_deref()
            .is_some_and(|reason| QUOTA_REASONS.contains(&reason))
    });
    let message = error
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("official API returned HTTP {status}"));

    if status == 403 || quota_signal {
        return SourceError::QuotaExceeded { message };
    }
    if status == 404 {
        return SourceError::channel_not_found(subject);
    }
    SourceError::Upstream { status, message }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body(value: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn test_parse_official_search_maps_items() {
        let json = serde_json::json!({
            "items": [{
                "id": {"kind": "youtube#video", "videoId": "vid1"},
                "snippet": {
                    "title": "Compositing basics",
                    "description": "Node graphs",
                    "publishedAt": "2024-03-01T12:00:00Z",
                    "thumbnails": {
                        "default": {"url": "https://i/default.jpg"},
                        "high": {"url": "https://i/high.jpg"}
                    }
                }
            }]
        });

        let videos = parse_official_search(&body(&json)).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].external_id, "vid1");
        assert_eq!(videos[0].title, "Compositing basics");
        assert_eq!(videos[0].description, "Node graphs");
        assert_eq!(videos[0].thumbnail_url, "https://i/high.jpg");
        assert_eq!(
            videos[0].published_at.unwrap().to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_official_search_drops_incomplete_items() {
        let json = serde_json::json!({
            "items": [
                {"id": {"kind": "youtube#channel", "channelId": "UC1"}, "snippet": {"title": "Channel"}},
                {"id": {"videoId": "no-snippet"}},
                {"id": {"videoId": "blank-title"}, "snippet": {"title": ""}},
                {"id": "not-an-object", "snippet": {"title": "Broken"}},
                {"id": {"videoId": "ok"}, "snippet": {"title": "Kept"}}
            ]
        });

        let videos = parse_official_search(&body(&json)).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].external_id, "ok");
        assert_eq!(videos[0].description, "");
        assert_eq!(videos[0].thumbnail_url, "");
        assert!(videos[0].published_at.is_none());
    }

    #[test]
    fn test_parse_official_search_missing_items_is_empty() {
        assert!(parse_official_search(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_official_search_invalid_json() {
        assert!(matches!(
            parse_official_search(b"<html>"),
            Err(SourceError::JsonParse { .. })
        ));
    }

    #[test]
    fn test_classify_failure_403_is_quota() {
        let err = classify_failure(403, "", "UC1");
        assert!(matches!(err, SourceError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_classify_failure_quota_reason_on_other_status() {
        let body = serde_json::json!({
            "error": {
                "code": 400,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{"reason": "quotaExceeded"}]
            }
        })
        .to_string();
        let err = classify_failure(400, &body, "UC1");
        match err {
            SourceError::QuotaExceeded { message } => assert!(message.contains("quota")),
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_failure_404_is_channel_not_found() {
        let err = classify_failure(404, "{}", "UC404");
        match err {
            SourceError::ChannelNotFound { handle } => assert_eq!(handle, "UC404"),
            other => panic!("expected ChannelNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_failure_other_is_upstream_with_message() {
        let body = serde_json::json!({"error": {"message": "Invalid value for channelId"}}).to_string();
        let err = classify_failure(400, &body, "UC1");
        let msg = err.to_string();
        assert!(msg.contains("400"), "got: {msg}");
        assert!(msg.contains("Invalid value for channelId"), "got: {msg}");
    }

    #[test]
    fn test_classify_failure_non_json_body_falls_back_to_status() {
        let err = classify_failure(502, "Bad Gateway", "UC1");
        match err {
            SourceError::Upstream { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("502"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_blank_api_key() {
        assert!(matches!(
            OfficialApiSource::new("  ", HttpSettings::default()),
            Err(SourceError::MissingApiKey)
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let source = OfficialApiSource::new("secret-key", HttpSettings::default()).unwrap();
        let debug = format!("{source:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("googleapis"));
    }
}
