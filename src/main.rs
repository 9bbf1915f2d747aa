//! CLI entry point for vidscout.

use std::env;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use vidscout_core::{HttpSettings, ScoutConfig, SourceKind, build_default_scout};

mod app_config;
mod cli;

use app_config::{FileConfig, load_default_file_config, load_explicit_file_config};
use cli::Args;

/// Environment variable consulted for the official API key.
const API_KEY_ENV: &str = "VIDSCOUT_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_explicit_file_config(path)?,
        None => load_default_file_config()?,
    };
    let file_config = loaded.config.unwrap_or_default();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config
                .verbosity
                .map_or("info", |verbosity| verbosity.filter_level()),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON result only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        source = ?args.source,
        handle = %args.handle,
        keywords = %args.keywords,
        config_path = ?loaded.path,
        "CLI arguments parsed"
    );

    let kind = SourceKind::from(args.source);
    let scout_config = scout_config(&args, file_config);
    let scout = build_default_scout(&scout_config);

    let mut batch = scout
        .discover(kind, &args.handle, &args.keywords)
        .await
        .with_context(|| format!("Discovery through the {kind} source failed"))?;

    if args.match_keywords {
        let before = batch.videos.len();
        batch.retain_matching(&args.keywords);
        debug!(
            before,
            after = batch.videos.len(),
            "Applied keyword match filter"
        );
    }

    info!(source = %kind, videos = batch.videos.len(), "Vidscout finished");

    let rendered = serde_json::to_string_pretty(&batch).context("Failed to render JSON output")?;
    println!("{rendered}");

    Ok(())
}

/// Merges CLI flags, environment and file config into library settings.
///
/// API key priority: `--api-key` > `VIDSCOUT_API_KEY` > config file.
fn scout_config(args: &Args, file_config: FileConfig) -> ScoutConfig {
    let api_key = resolve_api_key(
        args.api_key.clone(),
        env::var(API_KEY_ENV).ok(),
        file_config.api_key,
    );

    ScoutConfig {
        api_key,
        official_base_url: file_config.official_api_base_url,
        internal_base_url: file_config.internal_api_base_url,
        feed_base_url: file_config.feed_base_url,
        browse_id: file_config.browse_id,
        http: HttpSettings::from_secs(
            file_config.connect_timeout_secs,
            file_config.read_timeout_secs,
        ),
    }
}

/// Picks the first non-blank key: flag, then environment, then config file.
fn resolve_api_key(
    flag: Option<String>,
    env_value: Option<String>,
    file_value: Option<String>,
) -> Option<String> {
    [flag, env_value, file_value]
        .into_iter()
        .flatten()
        .find(|key| !key.trim().is_empty())
}
