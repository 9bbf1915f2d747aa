//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use vidscout_core::SourceKind;

/// Find a channel's videos matching a keyword string.
///
/// Vidscout resolves a channel handle and fetches candidate videos through
/// the official data API, the internal browse API or the public feed, then
/// prints them as JSON.
#[derive(Parser, Debug)]
#[command(name = "vidscout")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Read defaults from this config file instead of the XDG location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Official API key (overrides VIDSCOUT_API_KEY and the config file)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Keep only videos whose title or description mentions a keyword
    #[arg(long)]
    pub match_keywords: bool,

    /// Which upstream path to query
    #[arg(value_enum)]
    pub source: SourceArg,

    /// Channel handle, with or without the leading '@'
    pub handle: String,

    /// Keyword string; commas, periods, semicolons and pipes act as separators
    pub keywords: String,
}

/// CLI spelling of [`SourceKind`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    /// Official data API (requires an API key)
    Official,
    /// Internal browse API
    Internal,
    /// Public video feed
    Rss,
}

impl From<SourceArg> for SourceKind {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Official => Self::OfficialApi,
            SourceArg::Internal => Self::InternalApi,
            SourceArg::Rss => Self::Rss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_minimal_args_parse_successfully() {
        let args = Args::try_parse_from(["vidscout", "rss", "@chan", "vfx"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.match_keywords);
        assert!(args.config.is_none());
        assert!(args.api_key.is_none());
        assert_eq!(args.source, SourceArg::Rss);
        assert_eq!(args.handle, "@chan");
        assert_eq!(args.keywords, "vfx");
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["vidscout", "-v", "rss", "c", "k"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["vidscout", "-vv", "rss", "c", "k"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag() {
        let args = Args::try_parse_from(["vidscout", "--quiet", "internal", "c", "k"]).unwrap();
        assert!(args.quiet);
        assert_eq!(args.source, SourceArg::Internal);
    }

    #[test]
    fn test_cli_options_parse() {
        let args = Args::try_parse_from([
            "vidscout",
            "--config",
            "/tmp/vidscout.toml",
            "--api-key",
            "abc",
            "--match-keywords",
            "official",
            "chan",
            "vfx, cgi",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/vidscout.toml")));
        assert_eq!(args.api_key.as_deref(), Some("abc"));
        assert!(args.match_keywords);
        assert_eq!(args.keywords, "vfx, cgi");
    }

    #[test]
    fn test_cli_rejects_unknown_source() {
        let result = Args::try_parse_from(["vidscout", "scrape", "chan", "vfx"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_keywords() {
        let result = Args::try_parse_from(["vidscout", "rss", "chan"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_source_arg_maps_to_kind() {
        assert_eq!(SourceKind::from(SourceArg::Official), SourceKind::OfficialApi);
        assert_eq!(SourceKind::from(SourceArg::Internal), SourceKind::InternalApi);
        assert_eq!(SourceKind::from(SourceArg::Rss), SourceKind::Rss);
    }
}
