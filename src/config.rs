//! Facade configuration.

use crate::error::ConfigError;
use sas_ftp::TransferOptions;
use sas_network::DEFAULT_PING_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

/// Settings fixed for the lifetime of a facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Address that is probed and used as both SQL and FTP host.
    #[serde(default = "default_target")]
    pub target: Ipv4Addr,
    /// FTP base path every transfer is relative to.
    #[serde(default = "default_remote_path")]
    pub remote_path: String,
    /// Timeout of the construction-time probe.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,
    #[serde(default)]
    pub transfer: TransferOptions,
}

fn default_target() -> Ipv4Addr {
    Ipv4Addr::new(103, 56, 148, 108)
}
fn default_remote_path() -> String {
    "/home".to_string()
}
fn default_ping_timeout() -> u64 {
    DEFAULT_PING_TIMEOUT_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            remote_path: default_remote_path(),
            ping_timeout_secs: default_ping_timeout(),
            transfer: TransferOptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Same settings, different target.
    pub fn with_target(mut self, target: Ipv4Addr) -> Self {
        self.target = target;
        self
    }
}
