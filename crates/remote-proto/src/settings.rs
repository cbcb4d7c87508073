//! Key-value settings store shared by the settings screen and the poller.
//!
//! Values are strings; the poller only ever reads `address` and `port`, at
//! the start of each tick.  Every `set` is announced on a broadcast channel
//! so a running session can react to reconfiguration.
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::Config;
use crate::protocol::Endpoint;

pub const KEY_ADDRESS: &str = "address";
pub const KEY_PORT: &str = "port";

pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Receives the name of every key written after this call.
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// Resolve the current endpoint, `None` when either key is missing or the
/// port does not parse.
pub fn endpoint_from(store: &dyn SettingsStore) -> Option<Endpoint> {
    let host = store.get(KEY_ADDRESS)?;
    let host = host.trim();
    if host.is_empty() {
        return None;
    }
    let port = store.get(KEY_PORT)?.trim().parse::<u16>().ok()?;
    Some(Endpoint::new(host, port))
}

pub fn is_endpoint_key(key: &str) -> bool {
    key == KEY_ADDRESS || key == KEY_PORT
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── in-memory ─────────────────────────────────────────────────────────────────

pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            values: Mutex::new(HashMap::new()),
            changes,
        }
    }

    pub fn with_endpoint(endpoint: &Endpoint) -> Self {
        let store = Self::new();
        {
            let mut values = lock(&store.values);
            values.insert(KEY_ADDRESS.to_string(), endpoint.host.clone());
            values.insert(KEY_PORT.to_string(), endpoint.port.to_string());
        }
        store
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        // No receivers is fine.
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

// ── config-file backed ────────────────────────────────────────────────────────

/// Settings persisted in `config.toml`.  `address` and `port` map onto the
/// `[remote]` table; other keys live only for the lifetime of the process.
pub struct FileSettings {
    path: PathBuf,
    config: Mutex<Config>,
    extra: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<String>,
}

impl FileSettings {
    pub fn new(path: PathBuf, config: Config) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            path,
            config: Mutex::new(config),
            extra: Mutex::new(HashMap::new()),
            changes,
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load_from(&path)?;
        Ok(Self::new(path, config))
    }

    pub fn config(&self) -> Config {
        lock(&self.config).clone()
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            KEY_ADDRESS => Some(lock(&self.config).remote.address.clone()),
            KEY_PORT => Some(lock(&self.config).remote.port.to_string()),
            _ => lock(&self.extra).get(key).cloned(),
        }
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            KEY_ADDRESS | KEY_PORT => {
                let snapshot = {
                    let mut config = lock(&self.config);
                    if key == KEY_ADDRESS {
                        config.remote.address = value.trim().to_string();
                    } else {
                        config.remote.port = value
                            .trim()
                            .parse()
                            .map_err(|e| anyhow::anyhow!("invalid port {:?}: {}", value, e))?;
                    }
                    config.clone()
                };
                if let Err(e) = snapshot.save_to(&self.path) {
                    warn!("settings: failed to save {}: {}", self.path.display(), e);
                    return Err(e);
                }
                debug!("settings: saved {} to {}", key, self.path.display());
            }
            _ => {
                lock(&self.extra).insert(key.to_string(), value.to_string());
            }
        }
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}
