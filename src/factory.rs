use crate::{
    config::Config,
    gateway::{Gateway, GatewayRemote},
    store::{Dashboard, DashboardOptions},
};
use anyhow::{Context, Result};
use homedir::my_home;
use std::{sync::Arc, time::Duration};

/// Builds the configured gateway and dashboard from config and environment.
pub struct AppFactory;

impl AppFactory {
    /// Load config from the base path, applying environment overrides
    pub fn create_config() -> Result<Config> {
        let base_path = Self::get_base_path()?;
        let mut config = Config::load_with(&base_path)?;

        if let Ok(api_url) = std::env::var("BBDASH_API_URL") {
            log::info!("Using api url from environment: {api_url}");
            config.api_url = api_url;
            config.validate()?;
        }

        Ok(config)
    }

    /// Create the remote gateway described by `config`
    pub fn create_gateway(config: &Config) -> Result<Arc<dyn Gateway>> {
        let basic_auth = Self::parse_basic_auth()?;
        let bearer_token = Self::parse_bearer_token();

        let gateway = GatewayRemote::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
            basic_auth,
            bearer_token,
        )
        .with_context(|| format!("failed to create gateway for {}", config.api_url))?;

        Ok(Arc::new(gateway))
    }

    pub fn create_dashboard(config: &Config) -> Result<Dashboard> {
        let gateway = Self::create_gateway(config)?;
        Ok(Dashboard::new(gateway, DashboardOptions::from(config)))
    }

    /// Get the base path for the application
    fn get_base_path() -> Result<String> {
        if let Ok(base_path) = std::env::var("BBDASH_BASE_PATH") {
            return Ok(base_path);
        }

        let home = my_home()
            .context("Could not determine home directory")?
            .context("Home directory path is empty")?;
        Ok(format!("{}/.local/share/bbdash", home.to_string_lossy()))
    }

    /// Parse basic authentication from environment
    fn parse_basic_auth() -> Result<Option<(String, Option<String>)>> {
        match std::env::var("BBDASH_BASIC_AUTH") {
            Ok(ba) => Ok(Self::split_basic_auth(&ba)),
            Err(_) => Ok(None),
        }
    }

    fn split_basic_auth(ba: &str) -> Option<(String, Option<String>)> {
        let parts: Vec<_> = ba.splitn(2, ':').collect();
        match parts.as_slice() {
            [username] if !username.is_empty() => Some((username.to_string(), None)),
            [username, password] if !username.is_empty() => {
                Some((username.to_string(), Some(password.to_string())))
            }
            _ => {
                log::warn!(
                    "Invalid BBDASH_BASIC_AUTH format. Expected 'username' or 'username:password'"
                );
                None
            }
        }
    }

    /// Parse bearer token from environment
    fn parse_bearer_token() -> Option<String> {
        std::env::var("BBDASH_AUTH_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
