//! Shared HTTP client construction policy for source paths.
//!
//! Centralizes user-agent and compression defaults so the three source
//! paths stay consistent. No timeout is applied unless the caller sets one;
//! the underlying client defaults govern otherwise.

use std::time::Duration;

use reqwest::Client;

use crate::user_agent;

use super::SourceError;

/// Optional HTTP timeouts applied to every source client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpSettings {
    /// TCP connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whole-request timeout.
    pub read_timeout: Option<Duration>,
}

impl HttpSettings {
    /// Creates settings from optional second counts.
    #[must_use]
    pub fn from_secs(connect_timeout_secs: Option<u64>, read_timeout_secs: Option<u64>) -> Self {
        Self {
            connect_timeout: connect_timeout_secs.map(Duration::from_secs),
            read_timeout: read_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Builds a source HTTP client using shared project policy.
///
/// `source_name` is only used in error messages, not in the User-Agent header.
///
/// # Errors
///
/// Returns [`SourceError::HttpClient`] when client construction fails.
pub fn build_source_http_client(
    source_name: &str,
    settings: HttpSettings,
) -> Result<Client, SourceError> {
    let mut builder = Client::builder()
        .user_agent(user_agent::default_source_user_agent())
        .gzip(true);

    if let Some(timeout) = settings.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = settings.read_timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|error| SourceError::http_client(source_name, error))
}

/// Joins a base URL and a path without doubling slashes.
#[must_use]
pub(crate) fn join_base(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
