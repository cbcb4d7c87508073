use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Where the mpv control server lives.  These two fields back the
/// `address` / `port` keys of the settings store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Cadence of `/mpv/status` polls.
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
    /// Cadence of `/ping` health checks.
    #[serde(default = "default_health_interval_ms")]
    pub health_interval_ms: u64,
    /// Per-request timeout.  `0` leaves reqwest's default (no timeout).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl PollingConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms.max(1))
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: default_status_interval_ms(),
            health_interval_ms: default_health_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_address() -> String {
    "192.168.0.17".to_string()
}

fn default_port() -> u16 {
    6969
}

fn default_status_interval_ms() -> u64 {
    1000
}

fn default_health_interval_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    4000
}

impl Config {
    /// Read the config at `path`, writing the defaults there on first run.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
