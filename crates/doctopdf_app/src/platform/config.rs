//! Startup configuration read from `doctopdf.ron`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use doctopdf_core::DEFAULT_AGENT_ID;
use doctopdf_engine::GatewaySettings;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "doctopdf.ron";
pub const CONFIG_PATH_ENV: &str = "DOCTOPDF_CONFIG";
pub const ENDPOINT_ENV: &str = "DOCTOPDF_ENDPOINT";
pub const AGENT_ID_ENV: &str = "DOCTOPDF_AGENT_ID";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub agent_id: String,
    /// Name of the environment variable holding the agent API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    pub step_interval_ms: u64,
    pub history_dir: PathBuf,
    pub log_to_terminal: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/v1/agent/invoke".to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            api_key_env: "DOCTOPDF_API_KEY".to_string(),
            request_timeout_secs: 120,
            step_interval_ms: 4000,
            history_dir: PathBuf::from("."),
            log_to_terminal: false,
        }
    }
}

impl AppConfig {
    /// Loads from `DOCTOPDF_CONFIG` or `./doctopdf.ron`, then applies env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(endpoint) = non_blank(ENDPOINT_ENV) {
            self.endpoint = endpoint;
        }
        if let Some(agent_id) = non_blank(AGENT_ID_ENV) {
            self.agent_id = agent_id;
        }
    }

    pub fn gateway_settings(&self, lookup: impl Fn(&str) -> Option<String>) -> GatewaySettings {
        let mut settings = GatewaySettings::new(self.endpoint.clone());
        settings.api_key = lookup(&self.api_key_env).filter(|key| !key.is_empty());
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        settings
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms.max(1))
    }
}
