//! Error types for channel resolution and video source fetches.
//!
//! Every source path converts its own failures into one [`SourceError`]
//! value; nothing escapes as a panic. Variants follow the What/Why/Fix
//! pattern used across the project.

use thiserror::Error;

/// Errors that can occur while resolving a channel or fetching videos.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The channel lookup matched nothing.
    #[error("channel not found for '{handle}'\n  Suggestion: Check the handle spelling")]
    ChannelNotFound {
        /// The handle or channel id that was looked up
        handle: String,
    },

    /// The channel exists but exposes no thumbnail of any size.
    #[error(
        "channel '{channel_id}' has no avatar thumbnail\n  Suggestion: Retry later or use a placeholder avatar"
    )]
    ChannelAvatarMissing {
        /// The resolved channel id
        channel_id: String,
    },

    /// Transport failure or non-success HTTP status reaching an upstream source.
    #[error("network error{}: {message}\n  Suggestion: {suggestion}", status_suffix(.status))]
    Network {
        /// HTTP status when a response was obtained
        status: Option<u16>,
        /// What went wrong
        message: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The response body was not valid JSON.
    #[error("response is not valid JSON: {reason}\n  Suggestion: The upstream format may have changed")]
    JsonParse {
        /// Parser failure detail
        reason: String,
    },

    /// The feed failed structural XML validation.
    #[error("feed is not well-formed XML: {reason}\n  Suggestion: The feed may be truncated or the handle may not exist")]
    InvalidXml {
        /// Parser failure detail
        reason: String,
    },

    /// The official API reported quota or key exhaustion.
    #[error("API quota exceeded: {message}\n  Suggestion: Wait for the quota to reset or use a different API key")]
    QuotaExceeded {
        /// Upstream message
        message: String,
    },

    /// Any other failure reported by the official API.
    #[error("upstream error (HTTP {status}): {message}")]
    Upstream {
        /// Upstream HTTP status
        status: u16,
        /// Upstream message
        message: String,
    },

    /// Any other failure while fetching or processing a feed.
    #[error("feed processing failed: {reason}")]
    FeedProcessing {
        /// What went wrong
        reason: String,
    },

    /// The official source was configured without an API key.
    #[error("official API key is missing\n  Suggestion: Set `api_key` in the config file or VIDSCOUT_API_KEY")]
    MissingApiKey,

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed for {source_name}: {reason}")]
    HttpClient {
        /// Which source was being built
        source_name: String,
        /// Builder failure detail
        reason: String,
    },
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl SourceError {
    /// Creates a `ChannelNotFound` error.
    #[must_use]
    pub fn channel_not_found(handle: &str) -> Self {
        Self::ChannelNotFound {
            handle: handle.to_string(),
        }
    }

    /// Creates a `Network` error for a transport failure with no response.
    #[must_use]
    pub fn transport(error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {error}")
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        };
        Self::Network {
            status: error.status().map(|s| s.as_u16()),
            message,
            suggestion: "Check your network connection and retry".to_string(),
        }
    }

    /// Creates a `Network` error for a non-success HTTP status.
    ///
    /// 404 and 429 carry dedicated messages.
    #[must_use]
    pub fn http_status(status: u16) -> Self {
        let (message, suggestion) = match status {
            404 => ("Channel not found", "Check the handle spelling"),
            429 => ("Too many requests", "Wait a few minutes before retrying"),
            s if s >= 500 => ("Upstream unavailable", "Try again later"),
            _ => ("Unexpected HTTP status", "Check the request and try again"),
        };
        Self::Network {
            status: Some(status),
            message: message.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `Network` error for a request URL that could not be built.
    #[must_use]
    pub fn invalid_url(base_url: &str, error: &url::ParseError) -> Self {
        Self::Network {
            status: None,
            message: format!("invalid request URL from '{base_url}': {error}"),
            suggestion: "Check the configured base URL".to_string(),
        }
    }

    /// Creates a `JsonParse` error.
    #[must_use]
    pub fn json_parse(reason: impl std::fmt::Display) -> Self {
        Self::JsonParse {
            reason: reason.to_string(),
        }
    }

    /// Creates an `InvalidXml` error.
    #[must_use]
    pub fn invalid_xml(reason: impl std::fmt::Display) -> Self {
        Self::InvalidXml {
            reason: reason.to_string(),
        }
    }

    /// Creates a `FeedProcessing` error.
    #[must_use]
    pub fn feed_processing(reason: impl std::fmt::Display) -> Self {
        Self::FeedProcessing {
            reason: reason.to_string(),
        }
    }

    /// Creates an `HttpClient` error.
    #[must_use]
    pub fn http_client(source_name: &str, reason: impl std::fmt::Display) -> Self {
        Self::HttpClient {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns the HTTP status attached to this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_404_message() {
        let err = SourceError::http_status(404);
        assert_eq!(err.status(), Some(404));
        let msg = err.to_string();
        assert!(msg.contains("Channel not found"), "got: {msg}");
        assert!(msg.contains("HTTP 404"), "got: {msg}");
    }

    #[test]
    fn test_http_status_429_message() {
        let msg = SourceError::http_status(429).to_string();
        assert!(msg.contains("Too many requests"), "got: {msg}");
    }

    #[test]
    fn test_http_status_other_message_keeps_status() {
        let err = SourceError::http_status(418);
        assert!(err.to_string().contains("HTTP 418"));
    }

    #[test]
    fn test_upstream_message_includes_status_and_message() {
        let err = SourceError::Upstream {
            status: 400,
            message: "Invalid channel id".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Invalid channel id"));
    }

    #[test]
    fn test_channel_errors_are_distinct() {
        let not_found = SourceError::channel_not_found("someone");
        let no_avatar = SourceError::ChannelAvatarMissing {
            channel_id: "UC123".to_string(),
        };
        assert!(matches!(not_found, SourceError::ChannelNotFound { .. }));
        assert!(no_avatar.to_string().contains("UC123"));
        assert!(no_avatar.to_string().contains("placeholder"));
    }

    #[test]
    fn test_source_error_clone() {
        let err = SourceError::json_parse("expected value at line 1");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
