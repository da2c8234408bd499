use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::store::{SortBy, ViewMode};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_API_URL: &str = "http://localhost:5000";
/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// The backend caps semantic search at 15 results
const DEFAULT_SEARCH_LIMIT: usize = 15;
pub const MAX_SEARCH_LIMIT: usize = 15;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base url of the bookmarks API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Result cap passed to semantic search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default)]
    pub default_sort: SortBy,

    #[serde(default)]
    pub default_view_mode: ViewMode,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            search_limit: DEFAULT_SEARCH_LIMIT,
            default_sort: SortBy::default(),
            default_view_mode: ViewMode::default(),
            base_path: String::new(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.api_url)
            .with_context(|| format!("api_url {:?} is not a valid url", self.api_url))?;

        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if !(1..=MAX_SEARCH_LIMIT).contains(&self.search_limit) {
            anyhow::bail!(
                "search_limit must be between 1 and {MAX_SEARCH_LIMIT}, got {}",
                self.search_limit
            );
        }

        Ok(())
    }

    pub fn load_with(base_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(base_path).join(CONFIG_FILE);

        // create new if does not exist
        if !path.exists() {
            std::fs::create_dir_all(base_path)
                .with_context(|| format!("failed to create {base_path}"))?;
            std::fs::write(&path, serde_yml::to_string(&Self::default())?)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Path::new(&self.base_path).join(CONFIG_FILE);

        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(&path, config_str)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(())
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}
