//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// TOML-backed file configuration for vidscout defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Official API key.
    pub api_key: Option<String>,
    /// Official API base URL override.
    pub official_api_base_url: Option<String>,
    /// Internal API base URL override.
    pub internal_api_base_url: Option<String>,
    /// Feed host override.
    pub feed_base_url: Option<String>,
    /// Internal browse id override.
    pub browse_id: Option<String>,
    /// Optional source client connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Optional source client read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        for (field, value) in [
            ("official_api_base_url", &self.official_api_base_url),
            ("internal_api_base_url", &self.internal_api_base_url),
            ("feed_base_url", &self.feed_base_url),
        ] {
            validate_base_url(field, value.as_deref())?;
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_base_url(field: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let parsed = url::Url::parse(value)
        .with_context(|| format!("Invalid config value for `{field}`: '{value}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("Invalid config value for `{field}`: expected an http:// or https:// URL");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the tracing filter level this setting maps to.
    #[must_use]
    pub fn filter_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/vidscout/config.toml`
/// 2. `$HOME/.config/vidscout/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("vidscout")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("vidscout")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref().filter(|p| p.exists()) else {
        return Ok(LoadedConfig { path, config: None });
    };

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

/// Loads config from an explicit path, which must exist.
pub fn load_explicit_file_config(path: &Path) -> Result<LoadedConfig> {
    let config = load_file_config(path)?;
    Ok(LoadedConfig {
        path: Some(path.to_path_buf()),
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;

        match key {
            "api_key" => cfg.api_key = Some(parse_string_field(key, value, line_no)?),
            "official_api_base_url" => {
                cfg.official_api_base_url = Some(parse_string_field(key, value, line_no)?);
            }
            "internal_api_base_url" => {
                cfg.internal_api_base_url = Some(parse_string_field(key, value, line_no)?);
            }
            "feed_base_url" => cfg.feed_base_url = Some(parse_string_field(key, value, line_no)?),
            "browse_id" => cfg.browse_id = Some(parse_string_field(key, value, line_no)?),
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                cfg.read_timeout_secs = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_field(key, value, line_no)?;
                cfg.verbosity = Some(
                    parse_verbosity(&parsed)
                        .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?,
                );
            }
            _ => bail!("Unknown configuration key `{key}` on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_string_field(key: &str, value: &str, line_no: usize) -> Result<String> {
    parse_string_literal(value).with_context(|| format!("Invalid `{key}` value on line {line_no}"))
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
api_key = "abc123"
official_api_base_url = "http://127.0.0.1:9000/v3"
internal_api_base_url = "http://127.0.0.1:9001"
feed_base_url = "https://feeds.example.com"
browse_id = "UCfixed"
connect_timeout_secs = 5
read_timeout_secs = 30
verbosity = "verbose"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.api_key.as_deref(), Some("abc123"));
        assert_eq!(
            cfg.official_api_base_url.as_deref(),
            Some("http://127.0.0.1:9000/v3")
        );
        assert_eq!(cfg.browse_id.as_deref(), Some("UCfixed"));
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(30));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(r#"verbosity = "quiet""#).expect("partial config should parse");
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
        assert!(cfg.api_key.is_none());
        assert!(cfg.read_timeout_secs.is_none());
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r##"
browse_id = "UC#hash" # fixed browse target
read_timeout_secs = 10 # seconds
"##,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.browse_id.as_deref(), Some("UC#hash"));
        assert_eq!(cfg.read_timeout_secs, Some(10));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err = parse_config_str("connect_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err = parse_config_str("read_timeout_secs = 4 trailing")
            .expect_err("expected trailing token error");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("api_key = abc").expect_err("unquoted string expected");
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_parse_config_rejects_non_http_base_url() {
        let err = parse_config_str(r#"feed_base_url = "ftp://example.com""#)
            .expect_err("non-http base url expected");
        assert!(err.to_string().contains("feed_base_url"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("api_key").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_verbosity_filter_levels() {
        assert_eq!(VerbositySetting::Default.filter_level(), "info");
        assert_eq!(VerbositySetting::Verbose.filter_level(), "debug");
        assert_eq!(VerbositySetting::Quiet.filter_level(), "error");
        assert_eq!(VerbositySetting::Debug.filter_level(), "trace");
    }

    #[test]
    fn test_load_explicit_file_config_missing_file_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        let err = load_explicit_file_config(&missing).expect_err("missing file should error");
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_explicit_file_config_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "browse_id = \"UCfile\"\n").expect("write config");
        let loaded = load_explicit_file_config(&path).expect("config should load");
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(
            loaded.config.and_then(|c| c.browse_id).as_deref(),
            Some("UCfile")
        );
    }
}
