use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::JarimaError;

/// Top-level jarima configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub modem: ModemConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Serial modem settings.
///
/// The wait fields make the fixed post-command delays of the AT protocol
/// explicit: every command is written, the given number of milliseconds is
/// waited, and whatever bytes arrived are drained. A device slower than the
/// wait yields a truncated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemConfig {
    /// Serial device path. Empty means auto-detect the first USB adapter.
    #[serde(default)]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Wait after the gating `AT` liveness probe.
    #[serde(default = "default_probe_wait_ms")]
    pub probe_wait_ms: u64,
    /// Wait after fire-and-forget setup commands (`ATE0`, clock set).
    #[serde(default = "default_setup_wait_ms")]
    pub setup_wait_ms: u64,
    /// Wait after short query commands (clock read-back, text-mode select).
    #[serde(default = "default_query_wait_ms")]
    pub query_wait_ms: u64,
    /// Wait after `AT+CMGL` while the device enumerates storage.
    #[serde(default = "default_listing_wait_ms")]
    pub listing_wait_ms: u64,
    /// Wait after `AT+CMGD`.
    #[serde(default = "default_delete_wait_ms")]
    pub delete_wait_ms: u64,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: default_baud_rate(),
            probe_wait_ms: default_probe_wait_ms(),
            setup_wait_ms: default_setup_wait_ms(),
            query_wait_ms: default_query_wait_ms(),
            listing_wait_ms: default_listing_wait_ms(),
            delete_wait_ms: default_delete_wait_ms(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_baud_rate() -> u32 {
    38400
}

fn default_probe_wait_ms() -> u64 {
    200
}

fn default_setup_wait_ms() -> u64 {
    100
}

fn default_query_wait_ms() -> u64 {
    200
}

fn default_listing_wait_ms() -> u64 {
    5000
}

fn default_delete_wait_ms() -> u64 {
    5000
}

fn default_db_path() -> String {
    "~/.jarima/sms.db".to_string()
}

/// Expand `~` to the user's home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, JarimaError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| JarimaError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| JarimaError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
