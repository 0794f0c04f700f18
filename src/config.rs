use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::DEFAULT_USER_AGENT;

/// Main configuration structure that can be loaded from CLI, config file, or environment
///
/// Example configuration file content
/// # XHS Video Extractor Configuration
///
/// # Server configuration
/// listen_addr = "0.0.0.0"
/// listen_on_port = 10000
///
/// # Outbound fetch
/// user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)"
/// fetch_timeout_secs = 10
/// no_proxy = false
///
/// # Relay (optional, enables GET /api/xhs)
/// relay_url = "https://dlbunny.com/api/xhs"
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 10000)]
    #[serde(default = "default_port")]
    pub listen_on_port: u16,

    /// User-Agent header sent with every page fetch
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page fetch timeout in seconds
    #[arg(short = 't', long, default_value_t = 10)]
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Ignore HTTP(S)_PROXY environment variables for outbound requests
    #[arg(long)]
    pub no_proxy: bool,

    /// Download service that GET /api/xhs forwards to
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_on_port: default_port(),
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            no_proxy: false,
            relay_url: None,
            config: None,
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> Result<Self> {
        let mut config = Config::parse();

        if let Some(config_path) = &config.config {
            let file_config = Self::from_file(Path::new(config_path))?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence
    fn merge_with_file(mut self, file_config: Config) -> Self {
        // If CLI value is default, use file value
        if self.listen_addr == default_listen_addr() {
            self.listen_addr = file_config.listen_addr;
        }
        if self.listen_on_port == default_port() {
            self.listen_on_port = file_config.listen_on_port;
        }
        if self.user_agent == default_user_agent() {
            self.user_agent = file_config.user_agent;
        }
        if self.fetch_timeout_secs == default_fetch_timeout_secs() {
            self.fetch_timeout_secs = file_config.fetch_timeout_secs;
        }
        if !self.no_proxy {
            self.no_proxy = file_config.no_proxy;
        }
        if self.relay_url.is_none() {
            self.relay_url = file_config.relay_url;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Fetch timeout must be greater than zero"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(anyhow::anyhow!("User agent cannot be empty"));
        }

        if let Some(relay_url) = &self.relay_url {
            if relay_url.is_empty() {
                return Err(anyhow::anyhow!("Relay URL cannot be empty"));
            }
            if !relay_url.starts_with("http://") && !relay_url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "Relay URL must start with http:// or https://"
                ));
            }
        }

        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
