//! Vidscout Core Library
//!
//! Given a channel handle and a keyword string, this library locates the
//! channel, fetches candidate videos from one of three upstream sources and
//! normalizes each source's representation into a uniform [`VideoRecord`].
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`query`] - Validation and canonicalization of handle and keyword input
//! - [`source`] - Channel resolution, the three source paths and their parsers
//! - [`scout`] - Registry that runs a discovery through a chosen source path

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod query;
pub mod scout;
pub mod source;

mod user_agent;

// Re-export commonly used types
pub use query::{ChannelHandleQuery, QueryField, ValidationError, normalize_query};
pub use scout::{ScoutConfig, ScoutError, VideoScout, build_default_scout};
pub use source::{
    ChannelResolver, HttpSettings, InternalApiSource, OfficialApiSource, ResolvedChannel,
    RssSource, SourceError, SourceKind, VideoBatch, VideoRecord, VideoSource, parse_payload,
};
