//! Error types for query normalization.

use std::fmt;

use thiserror::Error;

/// The query field a validation error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryField {
    /// The raw channel handle.
    ChannelHandle,
    /// The raw keyword string.
    Keywords,
}

impl QueryField {
    /// Returns the stable field label used in messages and JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChannelHandle => "channelHandle",
            Self::Keywords => "keywords",
        }
    }
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The field was empty or whitespace-only after trimming.
    EmptyInput,
}

/// A field-attributed validation failure from [`super::normalize_query`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}\n  Suggestion: {suggestion}")]
pub struct ValidationError {
    /// The offending field.
    pub field: QueryField,
    /// Machine-readable failure kind.
    pub kind: ValidationErrorKind,
    /// Why the value was rejected.
    pub reason: String,
    /// How to fix the input.
    pub suggestion: String,
}

impl ValidationError {
    /// Creates an `EmptyInput` error for `field`.
    #[must_use]
    pub fn empty_input(field: QueryField) -> Self {
        let suggestion = match field {
            QueryField::ChannelHandle => "Provide a channel handle such as @SomeChannel",
            QueryField::Keywords => "Provide at least one keyword, e.g. \"vfx, motion\"",
        };
        Self {
            field,
            kind: ValidationErrorKind::EmptyInput,
            reason: "value is empty".to_string(),
            suggestion: suggestion.to_string(),
        }
    }
}

/// Joins several validation errors into one line per field.
#[must_use]
pub fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
