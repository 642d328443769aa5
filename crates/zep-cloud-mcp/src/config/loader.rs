//! Server configuration: defaults, optional TOML file, then environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use zep_cloud::{ClientOptions, DEFAULT_BASE_URL, DEFAULT_USER_ID};

use crate::types::{McpError, McpResult};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "ZEP_API_KEY";
/// Environment variable overriding the API root.
pub const ENV_BASE_URL: &str = "ZEP_BASE_URL";
/// Environment variable overriding the user id.
pub const ENV_USER_ID: &str = "ZEP_USER_ID";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Zep Cloud API key. Required for a working client.
    pub api_key: Option<String>,
    /// Zep Cloud API root.
    pub base_url: String,
    /// User that owns every thread and graph the server touches.
    pub user_id: String,
    /// Per-request deadline in seconds.
    pub timeout_secs: u64,
    /// Surface provisioning failures instead of tolerating them.
    pub strict_provisioning: bool,
    /// Default log filter.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            strict_provisioning: false,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> McpResult<Self> {
        toml::from_str(text).map_err(|e| McpError::Config(e.to_string()))
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> McpResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            McpError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`. Blank values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(user) = get(ENV_USER_ID) {
            self.user_id = user;
        }
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            user_id: self.user_id.clone(),
            strict_provisioning: self.strict_provisioning,
        }
    }
}

/// `<config dir>/zep-cloud-mcp/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zep-cloud-mcp").join("config.toml"))
}

/// Resolve the effective configuration.
///
/// An explicit `path` must exist. Without one, the default location is read
/// when present. Environment variables override file values.
pub fn load_config(path: Option<&str>) -> McpResult<ServerConfig> {
    let mut config = match path {
        Some(p) => ServerConfig::from_file(Path::new(p))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(p) => {
                tracing::debug!("Loading configuration from {}", p.display());
                ServerConfig::from_file(&p)?
            }
            None => ServerConfig::default(),
        },
    };
    config.apply_env();
    Ok(config)
}
