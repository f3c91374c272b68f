//! Shared types for the FTP crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

// ─── Options ─────────────────────────────────────────────────────────

/// Passive mode used to open the data channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DataChannelMode {
    /// `PASV`, server returns `h1,h2,h3,h4,p1,p2`.
    Passive,
    /// `EPSV`, server returns only a port on the control host.
    ExtendedPassive,
}

impl Default for DataChannelMode {
    fn default() -> Self {
        Self::Passive
    }
}

/// Timeouts and data-channel policy shared by every transfer command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferOptions {
    /// Control connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_sec: u64,
    /// Data-channel connect and transfer timeout in seconds.
    #[serde(default = "default_data_timeout")]
    pub data_timeout_sec: u64,
    #[serde(default)]
    pub data_channel_mode: DataChannelMode,
}

fn default_connect_timeout() -> u64 {
    15
}
fn default_data_timeout() -> u64 {
    30
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            connect_timeout_sec: default_connect_timeout(),
            data_timeout_sec: default_data_timeout(),
            data_channel_mode: DataChannelMode::Passive,
        }
    }
}

// ─── Endpoint / credentials ──────────────────────────────────────────

/// Where the control connection goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpEndpoint {
    pub host: String,
    pub port: u16,
}

impl FtpEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `ftp://host:port/path` with the path percent-encoded. The port is
    /// omitted when it is the scheme default (21).
    pub fn uri(&self, path: &str) -> String {
        match Url::parse(&format!("ftp://{}", self.address())) {
            Ok(mut url) => {
                url.set_path(path);
                url.to_string()
            }
            Err(_) => format!("ftp://{}{}", self.address(), path),
        }
    }
}

/// Username/password captured at connect time and reused by every command.
#[derive(Clone, PartialEq, Eq)]
pub struct FtpCredentials {
    pub username: String,
    pub password: String,
}

impl FtpCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for FtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

// ─── Replies ─────────────────────────────────────────────────────────

/// A parsed FTP reply (possibly multi-line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpResponse {
    pub code: u16,
    pub lines: Vec<String>,
}

impl FtpResponse {
    /// Full response text (all lines joined).
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// The closing status line, e.g. `226 Transfer complete.`
    pub fn status_description(&self) -> String {
        self.lines.last().cloned().unwrap_or_else(|| self.code.to_string())
    }

    /// Whether the response code indicates success (1xx–3xx).
    pub fn is_success(&self) -> bool {
        self.code < 400
    }

    /// Whether this is a positive-preliminary reply (1xx).
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// Whether this is a positive-completion reply (2xx).
    pub fn is_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}
