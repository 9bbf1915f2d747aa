//! Query normalization for channel handle and keyword inputs.
//!
//! Raw user input is validated and canonicalized here before any network
//! call is made. Normalization is pure and idempotent: feeding an already
//! normalized [`ChannelHandleQuery`] back through [`normalize_query`]
//! yields the same values.
//!
//! # Example
//!
//! ```
//! use vidscout_core::query::normalize_query;
//!
//! let query = normalize_query("@Foo Bar", "vfx, cgi.  motion").unwrap();
//! assert_eq!(query.channel_handle(), "FooBar");
//! assert_eq!(query.keywords(), "vfx cgi motion");
//! ```

mod error;

pub use error::{QueryField, ValidationError, ValidationErrorKind, summarize};

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::source::VideoRecord;

/// Runs of whitespace and keyword separators collapsed into a single space.
static KEYWORD_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"[\s,.;|]+"));

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// A validated, canonical channel query.
///
/// Constructed once per request by [`normalize_query`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelHandleQuery {
    channel_handle: String,
    keywords: String,
}

impl ChannelHandleQuery {
    /// Handle without leading `@` and without whitespace.
    #[must_use]
    pub fn channel_handle(&self) -> &str {
        &self.channel_handle
    }

    /// Keywords separated by single spaces.
    #[must_use]
    pub fn keywords(&self) -> &str {
        &self.keywords
    }
}

/// Validates and canonicalizes raw handle and keyword strings.
///
/// # Errors
///
/// Returns one [`ValidationError`] per offending field when either input is
/// blank after normalization.
pub fn normalize_query(
    raw_handle: &str,
    raw_keywords: &str,
) -> Result<ChannelHandleQuery, Vec<ValidationError>> {
    let channel_handle = normalize_handle(raw_handle);
    let keywords = normalize_keywords(raw_keywords);

    let mut errors = Vec::new();
    if channel_handle.is_empty() {
        errors.push(ValidationError::empty_input(QueryField::ChannelHandle));
    }
    if keywords.is_empty() {
        errors.push(ValidationError::empty_input(QueryField::Keywords));
    }

    if errors.is_empty() {
        Ok(ChannelHandleQuery {
            channel_handle,
            keywords,
        })
    } else {
        Err(errors)
    }
}

/// Removes all whitespace from a handle, then strips leading `@`.
#[must_use]
pub fn normalize_handle(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.trim_start_matches('@').to_string()
}

/// Collapses whitespace, commas, periods, semicolons and pipes into single spaces.
#[must_use]
pub fn normalize_keywords(raw: &str) -> String {
    KEYWORD_SEPARATOR_RE
        .replace_all(raw, " ")
        .trim()
        .to_string()
}

/// Returns true if the record's title or description contains any keyword token.
///
/// Matching is case-insensitive. An empty keyword string matches everything.
#[must_use]
pub fn matches_keywords(record: &VideoRecord, keywords: &str) -> bool {
    let tokens: Vec<String> = normalize_keywords(keywords)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect();
    if tokens.is_empty() {
        return true;
    }

    let title = record.title.to_lowercase();
    let description = record.description.to_lowercase();
    tokens
        .iter()
        .any(|token| title.contains(token.as_str()) || description.contains(token.as_str()))
}
