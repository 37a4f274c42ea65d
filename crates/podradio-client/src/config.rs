//! Command line configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/podradio/config.toml` by default. The protocol client itself
//! never reads it; only the `podradio-ctl` front end does.
//!
//! ```toml
//! debug = false
//!
//! [device]
//! address = "AA:BB:CC:DD:EE:FF"
//! channel = 1
//!
//! [connection]
//! transport = "rfcomm"
//! read_timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::{DEFAULT_CHANNEL, Endpoint, StaticResolver};
use crate::error::{ClientError, ClientResult};
use crate::transport::SessionOptions;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the podradio command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Target device settings.
    pub device: DeviceSettings,

    /// Stream settings.
    pub connection: ConnectionSettings,
}

/// Which device to talk to when no target is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Device address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Service channel (RFCOMM channel or TCP port).
    pub channel: u16,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            address: None,
            channel: DEFAULT_CHANNEL,
        }
    }
}

/// Stream kind used to reach the service.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Bluetooth RFCOMM (Linux).
    #[default]
    Rfcomm,
    /// Plain TCP, the channel is the port.
    Tcp,
}

/// Stream settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Stream kind.
    pub transport: TransportKind,

    /// Read timeout in seconds; unset or 0 blocks indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout_secs: Option<u64>,

    /// Write timeout in seconds; unset or 0 blocks indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_timeout_secs: Option<u64>,
}

fn seconds(value: Option<u64>) -> Option<Duration> {
    value.filter(|&s| s > 0).map(Duration::from_secs)
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> ClientResult<Self> {
        Self::load_or_default(&Self::default_path())
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: &Path) -> ClientResult<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("podradio")
    }

    /// Session options derived from `[connection]`.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            read_timeout: seconds(self.connection.read_timeout_secs),
            write_timeout: seconds(self.connection.write_timeout_secs),
        }
    }

    /// Resolver for the configured device.
    pub fn resolver(&self) -> StaticResolver {
        match self.device.address {
            Some(ref address) => {
                StaticResolver::with_default(Endpoint::new(address, self.device.channel))
            }
            None => StaticResolver::new(self.device.channel),
        }
    }
}
