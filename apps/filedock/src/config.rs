//! Configuration for the filedock tools.
//!
//! Read from `~/.config/filedock/config.json` (or the `--config` path).
//! Every field is optional; command-line flags override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use filedock_session::{ClientConfig, DEFAULT_STORAGE_DIR, ServerConfig};
use filedock_transfer::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, Framing, RetryPolicy, TransferOptions,
};

/// Contents of `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiledockConfig {
    /// Server storage root.
    pub storage_dir: PathBuf,
    /// Attempts per chunk before a transfer gives up.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub framing: Framing,
    pub connect_timeout_secs: u64,
    /// Where `get` writes downloads.
    pub download_dir: PathBuf,
}

impl Default for FiledockConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            max_retries: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            framing: Framing::default(),
            connect_timeout_secs: 30,
            download_dir: PathBuf::from("."),
        }
    }
}

impl FiledockConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist and parse. The default path is optional:
    /// if it is missing the defaults are used, and if it fails to parse a
    /// warning is logged and the defaults are used.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        let path = default_config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        match Self::from_path(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "failed to parse config, using defaults: {e:#}"
                );
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            retry: self.retry_policy(),
            framing: self.framing,
        }
    }

    /// Server configuration listening on all interfaces at `port`.
    pub fn server_config(&self, port: u16) -> ServerConfig {
        ServerConfig {
            bind_addr: ([0, 0, 0, 0], port).into(),
            storage_dir: self.storage_dir.clone(),
            transfer: self.transfer_options(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            transfer: self.transfer_options(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            download_dir: self.download_dir.clone(),
        }
    }
}

/// `~/.config/filedock/config.json`, or the platform equivalent.
pub fn default_config_path() -> PathBuf {
    config_base_dir().join("filedock").join("config.json")
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}
