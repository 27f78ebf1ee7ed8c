//! Configuration file support for locus.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `LOCUS_`, sections separated by
//!    `__`, e.g. `LOCUS_COLLECT__MIN_FOLLOWERS`)
//! 3. Config file (./locus.toml, then ~/.config/locus/config.toml)
//! 4. Built-in defaults
//!
//! A plain `GITHUB_TOKEN` variable (also read from `.env`) is used when no
//! token is configured any other way.
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use LOCUS_GITHUB__TOKEN / GITHUB_TOKEN
//! api_url = "https://api.github.com"
//!
//! [collect]
//! location = "Bangalore"
//! min_followers = 100
//! request_delay_ms = 1000
//! timeout_secs = 30
//! max_retries = 2
//! verify_token = true
//!
//! [output]
//! dir = "data"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use locus::client::DEFAULT_TIMEOUT_SECS;
use locus::rate_limit::DEFAULT_REQUEST_DELAY_MS;
use locus::retry::DEFAULT_MAX_RETRIES;
use locus::{ClientOptions, GITHUB_API_URL, RetryConfig};
use serde::Deserialize;
use thiserror::Error;

/// Name of the plain token variable honored as a fallback.
pub const TOKEN_FALLBACK_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no GitHub token configured; set [github].token in locus.toml, \
         LOCUS_GITHUB__TOKEN, or GITHUB_TOKEN"
    )]
    MissingToken,
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    /// Defaults for `locus collect`.
    pub collect: CollectConfig,
    pub output: OutputConfig,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    pub token: Option<String>,
    /// API root, for GitHub Enterprise or a test server.
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: GITHUB_API_URL.to_string(),
        }
    }
}

/// Collection defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    /// Location filter of the user search.
    pub location: String,
    /// Users need strictly more followers than this.
    pub min_followers: u64,
    /// Pause after every request, in milliseconds.
    pub request_delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Retries of a request that failed at the transport level.
    pub max_retries: usize,
    /// Check the token before collecting.
    pub verify_token: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            location: "Bangalore".to_string(),
            min_followers: 100,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            verify_token: true,
        }
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding `users.csv` and `repositories.csv`.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/locus/config.toml)
    /// 3. Local config file (./locus.toml)
    /// 4. Environment variables with LOCUS_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("locus.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./locus.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., LOCUS_COLLECT__MIN_FOLLOWERS -> collect.min_followers
        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("LOCUS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// The configured token, or the `GITHUB_TOKEN` variable.
    pub fn github_token(&self) -> Result<String, ConfigError> {
        self.github_token_or(std::env::var(TOKEN_FALLBACK_VAR).ok())
    }

    fn github_token_or(&self, fallback: Option<String>) -> Result<String, ConfigError> {
        let non_blank = |t: &str| Some(t.trim().to_string()).filter(|t| !t.is_empty());
        self.github
            .token
            .as_deref()
            .and_then(non_blank)
            .or_else(|| fallback.as_deref().and_then(non_blank))
            .ok_or(ConfigError::MissingToken)
    }

    /// Client options built from the `[github]` and `[collect]` sections.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_url: self.github.api_url.clone(),
            request_delay: Duration::from_millis(self.collect.request_delay_ms),
            timeout: Duration::from_secs(self.collect.timeout_secs),
            retry: RetryConfig {
                max_retries: self.collect.max_retries,
                ..RetryConfig::default()
            },
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "locus").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
