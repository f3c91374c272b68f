//! FTP client (RFC 959, passive data channels per RFC 2428).
//!
//! Architecture:
//! - `types` - options, endpoint, credentials, replies
//! - `error` - FTP-specific error type
//! - `protocol` - command/reply codec on the control channel
//! - `connection` - TCP connect and banner
//! - `transfer` - PASV/EPSV data channels
//! - `client` - login, LIST, STOR, RETR, QUIT
//! - `service` - [`TransferSession`], the guarded facade surface

pub mod types;
pub mod error;
pub mod protocol;
pub mod connection;
pub mod transfer;
pub mod client;
pub mod service;

pub use types::*;
pub use error::{FtpError, FtpErrorKind, FtpResult};
pub use client::FtpClient;
pub use service::{TransferSession, DEFAULT_FTP_PORT, NOT_CONNECTED_MESSAGE};
