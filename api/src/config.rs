//! Process configuration, read once from the environment at start-up.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_DOWNLOADER_BIN, DEFAULT_DOWNLOAD_TIMEOUT_SECS};

const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2024-01-01";
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Content store connection settings
#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub token: Option<String>,
    pub use_cdn: bool,
    /// Overrides `https://<project>.api.sanity.io` (tests, proxies)
    pub api_host: Option<String>,
}

/// Media downloader settings
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Executable, resolved through PATH
    pub program: String,
    /// Arguments placed before the downloader's own (wrapper commands)
    pub leading_args: Vec<String>,
    pub public_dir: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sanity: SanityConfig,
    pub downloader: DownloaderConfig,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        // The Next.js front-end used NEXT_PUBLIC_ prefixed names for the same values
        let get_sanity = |key: &'static str, legacy: &'static str| get(key).or_else(|| get(legacy));

        let project_id = get_sanity("SANITY_PROJECT_ID", "NEXT_PUBLIC_SANITY_PROJECT_ID")
            .ok_or(ConfigError::Missing("SANITY_PROJECT_ID"))?;
        let dataset = get_sanity("SANITY_DATASET", "NEXT_PUBLIC_SANITY_DATASET")
            .unwrap_or_else(|| DEFAULT_DATASET.to_string());
        let api_version = get_sanity("SANITY_API_VERSION", "NEXT_PUBLIC_SANITY_API_VERSION")
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let use_cdn = match get("SANITY_USE_CDN") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                key: "SANITY_USE_CDN",
                value: v,
            })?,
            None => false,
        };

        let timeout_secs = match get("DOWNLOAD_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    key: "DOWNLOAD_TIMEOUT_SECS",
                    value: v,
                })?,
            None => DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        };

        let port = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: v })?,
            None => DEFAULT_PORT,
        };

        // TWMD_BIN may be a wrapper command line, e.g. `docker run --rm img twmd`
        let mut command = get("TWMD_BIN")
            .map(|v| v.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        let program = if command.is_empty() {
            DEFAULT_DOWNLOADER_BIN.to_string()
        } else {
            command.remove(0)
        };

        Ok(Self {
            sanity: SanityConfig {
                project_id,
                dataset,
                api_version,
                token: get("SANITY_API_TOKEN"),
                use_cdn,
                api_host: get("SANITY_API_HOST"),
            },
            downloader: DownloaderConfig {
                program,
                leading_args: command,
                public_dir: PathBuf::from(
                    get("PUBLIC_DIR").unwrap_or_else(|| DEFAULT_PUBLIC_DIR.to_string()),
                ),
                timeout: Duration::from_secs(timeout_secs),
            },
            port,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
