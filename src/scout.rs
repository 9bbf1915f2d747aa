//! Source registry that runs one discovery per caller-chosen source path.
//!
//! The [`VideoScout`] holds the configured [`VideoSource`]s and runs
//! normalize → fetch → parse for exactly the path the caller names. A
//! failing path is never retried through another one.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::query::{ValidationError, normalize_query, summarize};
use crate::source::{
    HttpSettings, InternalApiSource, OfficialApiSource, RssSource, SourceError, SourceKind,
    VideoBatch, VideoSource,
};

/// Errors from a scout discovery.
#[derive(Debug, Clone, Error)]
pub enum ScoutError {
    /// Raw input failed normalization; one entry per offending field.
    #[error("invalid query: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    /// No source of the requested kind is registered.
    #[error("source '{kind}' is not configured\n  Suggestion: {suggestion}")]
    SourceUnavailable {
        /// The requested kind
        kind: SourceKind,
        /// How to enable it
        suggestion: String,
    },

    /// The chosen source failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ScoutError {
    fn unavailable(kind: SourceKind) -> Self {
        let suggestion = match kind {
            SourceKind::OfficialApi => "Provide an API key to enable the official source",
            SourceKind::InternalApi | SourceKind::Rss => "Register the source before discovering",
        };
        Self::SourceUnavailable {
            kind,
            suggestion: suggestion.to_string(),
        }
    }
}

/// Settings for [`build_default_scout`].
#[derive(Debug, Clone, Default)]
pub struct ScoutConfig {
    /// Official API key; the official source is skipped without one.
    pub api_key: Option<String>,
    /// Override for the official API base URL.
    pub official_base_url: Option<String>,
    /// Override for the internal API base URL.
    pub internal_base_url: Option<String>,
    /// Override for the feed host.
    pub feed_base_url: Option<String>,
    /// Override for the internal browse id.
    pub browse_id: Option<String>,
    /// Timeouts shared by every source client.
    pub http: HttpSettings,
}

/// A registry of source paths keyed by [`SourceKind`].
pub struct VideoScout {
    sources: Vec<Box<dyn VideoSource>>,
}

impl VideoScout {
    /// Creates an empty scout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registers a source, replacing any source of the same kind.
    #[tracing::instrument(skip(self, source), fields(kind = %source.kind()))]
    pub fn register(&mut self, source: Box<dyn VideoSource>) {
        let kind = source.kind();
        let before = self.sources.len();
        self.sources.retain(|existing| existing.kind() != kind);
        if self.sources.len() != before {
            debug!("Replacing previously registered source");
        }
        self.sources.push(source);
    }

    /// Returns the registered source kinds in registration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|source| source.kind()).collect()
    }

    /// Returns true if no sources are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn source(&self, kind: SourceKind) -> Option<&dyn VideoSource> {
        self.sources
            .iter()
            .find(|source| source.kind() == kind)
            .map(AsRef::as_ref)
    }

    /// Normalizes the raw inputs and discovers videos through `kind`.
    ///
    /// # Errors
    ///
    /// [`ScoutError::Validation`] when either input is blank,
    /// [`ScoutError::SourceUnavailable`] when `kind` is not registered, and
    /// [`ScoutError::Source`] with the path's typed failure otherwise.
    #[tracing::instrument(skip(self), fields(kind = %kind))]
    pub async fn discover(
        &self,
        kind: SourceKind,
        raw_handle: &str,
        raw_keywords: &str,
    ) -> Result<VideoBatch, ScoutError> {
        let query = normalize_query(raw_handle, raw_keywords).map_err(ScoutError::Validation)?;
        let source = self.source(kind).ok_or_else(|| ScoutError::unavailable(kind))?;

        debug!(handle = query.channel_handle(), keywords = query.keywords(), "Discovering videos");
        let batch = source.discover(&query).await?;
        info!(count = batch.videos.len(), "Discovery complete");
        Ok(batch)
    }
}

impl Default for VideoScout {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a scout with every source the config allows.
///
/// A source whose construction fails is skipped with a warning so the
/// remaining paths stay usable.
#[must_use]
pub fn build_default_scout(config: &ScoutConfig) -> VideoScout {
    let mut scout = VideoScout::new();

    match config.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
        Some(api_key) => {
            let built = match &config.official_base_url {
                Some(base_url) => OfficialApiSource::with_base_url(api_key, base_url, config.http),
                None => OfficialApiSource::new(api_key, config.http),
            };
            match built {
                Ok(source) => scout.register(Box::new(source)),
                Err(error) => warn!(
                    error = %error,
                    "Official source unavailable; continuing with remaining sources"
                ),
            }
        }
        None => debug!("No API key configured; official source disabled"),
    }

    let internal = match &config.internal_base_url {
        Some(base_url) => InternalApiSource::with_base_url(base_url, config.http),
        None => InternalApiSource::new(config.http),
    };
    match internal {
        Ok(source) => {
            let source = match &config.browse_id {
                Some(browse_id) => source.with_browse_id(browse_id),
                None => source,
            };
            scout.register(Box::new(source));
        }
        Err(error) => warn!(
            error = %error,
            "Internal source unavailable; continuing with remaining sources"
        ),
    }

    let rss = match &config.feed_base_url {
        Some(base_url) => RssSource::with_base_url(base_url, config.http),
        None => RssSource::new(config.http),
    };
    match rss {
        Ok(source) => scout.register(Box::new(source)),
        Err(error) => warn!(
            error = %error,
            "Feed source unavailable; continuing with remaining sources"
        ),
    }

    scout
}
