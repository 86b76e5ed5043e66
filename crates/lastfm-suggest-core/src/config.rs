use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use lastfm_client::{ClientConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

use crate::{fetcher::DEFAULT_RADIO_SCHEME, labels::LabelOverrides};

pub const ENV_PREFIX: &str = "LASTFM_SUGGEST";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Runtime settings, layered from defaults, an optional TOML file and
/// `LASTFM_SUGGEST_*` environment variables (nested keys use `__`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub api_key: String,
    pub api_base_url: String,
    /// Session key forwarded to profile lookups.
    pub session_key: Option<String>,
    pub request_timeout_ms: u64,
    pub category_timeout_ms: u64,
    pub radio_scheme: String,
    pub labels: LabelOverrides,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            session_key: None,
            request_timeout_ms: 15_000,
            category_timeout_ms: 5_000,
            radio_scheme: DEFAULT_RADIO_SCHEME.to_string(),
            labels: LabelOverrides::default(),
        }
    }
}

impl SuggestConfig {
    /// Loads configuration. An explicit `path` must exist; the per-user
    /// default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = Self::default_path() {
                    builder = builder.add_source(File::from(default_path).required(false));
                }
            }
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().context("failed to read configuration")?;
        let config: SuggestConfig = settings
            .try_deserialize()
            .context("invalid configuration")?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("fm", "last", "lastfm-suggest")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_key: self.api_key.clone(),
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn category_timeout(&self) -> Duration {
        Duration::from_millis(self.category_timeout_ms)
    }
}
