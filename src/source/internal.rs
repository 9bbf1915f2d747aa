//! Internal-API path: a single unauthenticated browse request whose deeply
//! nested response is navigated defensively.
//!
//! The endpoint is undocumented and may change shape without notice. Every
//! lookup along the path yields `None` instead of failing, so a reshaped
//! response degrades to fewer (or zero) records, and a non-JSON body
//! degrades to [`SourceError::JsonParse`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::query::ChannelHandleQuery;

use super::http_client::{HttpSettings, build_source_http_client, join_base};
use super::{SourceError, SourceKind, VideoBatch, VideoRecord, VideoSource};

/// Default internal API host.
const DEFAULT_INTERNAL_BASE_URL: &str = "https://www.youtube.com";

/// Browse endpoint path, relative to the base URL.
const BROWSE_PATH: &str = "youtubei/v1/browse?prettyPrint=false";

/// Browse id sent when no other is configured.
pub const DEFAULT_BROWSE_ID: &str = "UCBR8-60-B28hp2BmDPdntcQ";

const CLIENT_NAME: &str = "WEB";
const CLIENT_VERSION: &str = "2.20240101.00.00";

/// Selects the channel's search tab.
const SEARCH_TAB_PARAMS: &str = "EgZzZWFyY2jyBgQKAloA";

/// Fetches channel search results from the internal browse endpoint.
pub struct InternalApiSource {
    client: Client,
    base_url: String,
    browse_id: String,
}

impl InternalApiSource {
    /// Creates a source against the default internal endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::HttpClient`] when client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_INTERNAL_BASE_URL, settings)
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
            client: build_source_http_client("internal", settings)?,
            base_url: base_url.into(),
            browse_id: DEFAULT_BROWSE_ID.to_string(),
        })
    }

    /// Overrides the browse id sent with each request.
    #[must_use]
    pub fn with_browse_id(mut self, browse_id: impl Into<String>) -> Self {
        self.browse_id = browse_id.into();
        self
    }

    /// Fetches videos for `handle` matching `keywords`.
    ///
    /// # Errors
    ///
    /// [`SourceError::Network`] for transport failures or a non-success
    /// status ("Channel not found" on 404, "Too many requests" on 429), and
    /// [`SourceError::JsonParse`] when the body is not JSON.
    #[tracing::instrument(skip(self), fields(source = "internal"))]
    pub async fn fetch_videos(
        &self,
        handle: &str,
        keywords: &str,
    ) -> Result<Vec<VideoRecord>, SourceError> {
        let url = join_base(&self.base_url, BROWSE_PATH);
        let body = build_browse_body(&self.browse_id, handle, keywords);

        debug!(api_url = %url, "Calling internal browse API");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Internal browse request failed");
                SourceError::transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = SourceError::http_status(status.as_u16());
            warn!(status = status.as_u16(), error = %error, "Internal browse API error");
            return Err(error);
        }

        let bytes = response.bytes().await.map_err(|e| SourceError::transport(&e))?;
        let videos = parse_internal_browse(&bytes)?;
        debug!(count = videos.len(), "Parsed internal browse results");
        Ok(videos)
    }
}

impl std::fmt::Debug for InternalApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalApiSource")
            .field("base_url", &self.base_url)
            .field("browse_id", &self.browse_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VideoSource for InternalApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::InternalApi
    }

    async fn discover(&self, query: &ChannelHandleQuery) -> Result<VideoBatch, SourceError> {
        let videos = self
            .fetch_videos(query.channel_handle(), query.keywords())
            .await?;
        Ok(VideoBatch::new(SourceKind::InternalApi, videos))
    }
}

/// Builds the browse request body: client metadata, browse id and the
/// URL-encoded handle and keywords.
pub(crate) fn build_browse_body(browse_id: &str, handle: &str, keywords: &str) -> Value {
    let encoded_handle = urlencoding::encode(handle);
    let encoded_keywords = urlencoding::encode(keywords);
    serde_json::json!({
        "context": {
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": CLIENT_VERSION,
                "hl": "en",
                "gl": "US",
                "originalUrl": format!(
                    "https://www.youtube.com/@{encoded_handle}/search?query={encoded_keywords}"
                ),
            }
        },
        "browseId": browse_id,
        "params": SEARCH_TAB_PARAMS,
        "query": encoded_keywords,
        "canonicalBaseUrl": format!("/@{encoded_handle}"),
    })
}

// ==================== Parsing ====================

/// Converts an internal browse response into video records.
///
/// Walks `contents.twoColumnBrowseResultsRenderer.tabs[]`, then each tab's
/// `tabRenderer` or `expandableTabRenderer` down through
/// `content.sectionListRenderer.contents[].itemSectionRenderer.contents[]`,
/// collecting every `videoRenderer`. Renderers without a `videoId` or title
/// are skipped.
///
/// # Errors
///
/// Returns [`SourceError::JsonParse`] when the body is not valid JSON.
pub fn parse_internal_browse(body: &[u8]) -> Result<Vec<VideoRecord>, SourceError> {
    let root: Value = serde_json::from_slice(body).map_err(SourceError::json_parse)?;

    let Some(tabs) = root
        .pointer("/contents/twoColumnBrowseResultsRenderer/tabs")
        .and_then(Value::as_array)
    else {
        debug!("Internal browse response has no tabs");
        return Ok(Vec::new());
    };

    let mut videos = Vec::new();
    for renderer in tabs.iter().filter_map(video_renderers_in_tab).flatten() {
        match video_renderer_to_record(renderer) {
            Some(record) => videos.push(record),
            None => warn!("Dropping videoRenderer without videoId or title"),
        }
    }
    Ok(videos)
}

fn video_renderers_in_tab(tab: &Value) -> Option<Vec<&Value>> {
    let renderer = tab
        .get("tabRenderer")
        .or_else(|| tab.get("expandableTabRenderer"))?;
    let sections = renderer
        .pointer("/content/sectionListRenderer/contents")?
        .as_array()?;

    Some(
        sections
            .iter()
            .filter_map(|section| {
                section
                    .pointer("/itemSectionRenderer/contents")
                    .and_then(Value::as_array)
            })
            .flatten()
            .filter_map(|item| item.get("videoRenderer"))
            .collect(),
    )
}

fn video_renderer_to_record(renderer: &Value) -> Option<VideoRecord> {
    let video_id = renderer.get("videoId")?.as_str()?;
    let title = text_of(renderer.get("title")?)?;
    let description = renderer
        .get("descriptionSnippet")
        .and_then(text_of)
        .unwrap_or_default();
    let thumbnail_url = renderer
        .pointer("/thumbnail/thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbs| thumbs.last())
        .and_then(|thumb| thumb.get("url"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    VideoRecord::try_new(video_id, title, description, thumbnail_url, None)
}

/// Concatenates `runs[].text`, falling back to `simpleText`.
fn text_of(node: &Value) -> Option<String> {
    if let Some(runs) = node.get("runs").and_then(Value::as_array) {
        let text: String = runs
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect();
        return Some(text);
    }
    node.get("simpleText")
        .and_then(Value::as_str)
        .map(str::to_string)
}
