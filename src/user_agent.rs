//! Shared User-Agent string for every source client.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/vidscout";

/// Default User-Agent for source requests (single shared format; no per-source name in header).
#[must_use]
pub(crate) fn default_source_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("vidscout/{version} (video-discovery-tool; +{PROJECT_UA_URL})")
}
