//! Channel resolution: handle to stable channel id and avatar URL.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::SourceError;
use super::http_client::{HttpSettings, build_source_http_client, join_base};
use super::official::{DEFAULT_OFFICIAL_BASE_URL, classify_failure};
use super::thumbnails::{ThumbnailSet, select_thumbnail};

/// A channel resolved from a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChannel {
    /// Stable channel id.
    pub channel_id: String,
    /// Highest-resolution avatar URL the channel offers.
    pub channel_avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: Option<String>,
    snippet: Option<ChannelSnippet>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    #[serde(default)]
    thumbnails: ThumbnailSet,
}

/// Resolves handles through the official channel-lookup endpoint.
///
/// One request per call and no retries; the caller decides whether to
/// retry the whole operation.
#[derive(Clone)]
pub struct ChannelResolver {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ChannelResolver {
    /// Creates a resolver against the default official API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingApiKey`] for a blank key, or
    /// [`SourceError::HttpClient`] when client construction fails.
    pub fn new(api_key: impl Into<String>, settings: HttpSettings) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, DEFAULT_OFFICIAL_BASE_URL, settings)
    }

    /// Creates a resolver with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`ChannelResolver::new`].
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, SourceError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(SourceError::MissingApiKey);
        }
        let client = build_source_http_client("channel", settings)?;
        Ok(Self::from_parts(client, base_url.into(), api_key))
    }

    pub(crate) fn from_parts(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Resolves a normalized handle to its channel id and avatar.
    ///
    /// # Errors
    ///
    /// [`SourceError::ChannelNotFound`] when nothing matches,
    /// [`SourceError::ChannelAvatarMissing`] when the channel has no
    /// thumbnail of any size, plus the official API failures described on
    /// [`super::OfficialApiSource::fetch_videos`].
    #[tracing::instrument(skip(self), fields(source = "official"))]
    pub async fn resolve_channel(&self, handle: &str) -> Result<ResolvedChannel, SourceError> {
        let url = Url::parse_with_params(
            &join_base(&self.base_url, "channels"),
            &[
                ("part", "snippet"),
                ("forHandle", handle),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| SourceError::invalid_url(&self.base_url, &e))?;

        debug!("Calling official channel lookup");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Channel lookup request failed");
            SourceError::transport(&e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| SourceError::transport(&e))?;

        if !(200..300).contains(&status) {
            let error = classify_failure(status, &body, handle);
            warn!(status, error = %error, "Channel lookup error");
            return Err(error);
        }

        let channel = parse_channel_lookup(handle, body.as_bytes())?;
        debug!(channel_id = %channel.channel_id, "Resolved channel");
        Ok(channel)
    }
}

impl std::fmt::Debug for ChannelResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelResolver")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Extracts the first matching channel from a lookup response.
pub(crate) fn parse_channel_lookup(
    handle: &str,
    body: &[u8],
) -> Result<ResolvedChannel, SourceError> {
    let response: ChannelListResponse =
        serde_json::from_slice(body).map_err(SourceError::json_parse)?;

    let Some(item) = response.items.into_iter().next() else {
        return Err(SourceError::channel_not_found(handle));
    };
    let Some(channel_id) = item.id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty())
    else {
        return Err(SourceError::channel_not_found(handle));
    };

    let avatar = item
        .snippet
        .as_ref()
        .and_then(|snippet| select_thumbnail(&snippet.thumbnails));
    let Some(channel_avatar_url) = avatar else {
        return Err(SourceError::ChannelAvatarMissing { channel_id });
    };

    Ok(ResolvedChannel {
        channel_id,
        channel_avatar_url,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body(value: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn test_parse_channel_lookup_picks_high_avatar() {
        let json = serde_json::json!({
            "items": [{
                "id": "UCabc",
                "snippet": {"thumbnails": {
                    "default": {"url": "https://a/88.jpg"},
                    "medium": {"url": "https://a/240.jpg"},
                    "high": {"url": "https://a/800.jpg"}
                }}
            }]
        });
        let channel = parse_channel_lookup("someone", &body(&json)).unwrap();
        assert_eq!(channel.channel_id, "UCabc");
        assert_eq!(channel.channel_avatar_url, "https://a/800.jpg");
    }

    #[test]
    fn test_parse_channel_lookup_zero_items_is_not_found() {
        let json = serde_json::json!({"pageInfo": {"totalResults": 0}});
        match parse_channel_lookup("ghost", &body(&json)) {
            Err(SourceError::ChannelNotFound { handle }) => assert_eq!(handle, "ghost"),
            other => panic!("expected ChannelNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_channel_lookup_without_thumbnails_is_avatar_missing() {
        let json = serde_json::json!({"items": [{"id": "UCabc", "snippet": {"thumbnails": {}}}]});
        match parse_channel_lookup("someone", &body(&json)) {
            Err(SourceError::ChannelAvatarMissing { channel_id }) => {
                assert_eq!(channel_id, "UCabc");
            }
            other => panic!("expected ChannelAvatarMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_channel_lookup_without_snippet_is_avatar_missing() {
        let json = serde_json::json!({"items": [{"id": "UCabc"}]});
        assert!(matches!(
            parse_channel_lookup("someone", &body(&json)),
            Err(SourceError::ChannelAvatarMissing { .. })
        ));
    }

    #[test]
    fn test_parse_channel_lookup_blank_id_is_not_found() {
        let json = serde_json::json!({"items": [{"id": " "}]});
        assert!(matches!(
            parse_channel_lookup("someone", &body(&json)),
            Err(SourceError::ChannelNotFound { .. })
        ));
    }

    #[test]
    fn test_with_base_url_rejects_blank_key() {
        assert!(matches!(
            ChannelResolver::with_base_url("", "http://localhost", HttpSettings::default()),
            Err(SourceError::MissingApiKey)
        ));
    }
}
