//! FTP-specific error type.

use sas_core::Failure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorised FTP error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FtpError {
    pub kind: FtpErrorKind,
    pub message: String,
    /// FTP response code that triggered the error, if any.
    pub code: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FtpErrorKind {
    /// TCP / DNS resolution failure.
    ConnectionFailed,
    /// Wrong username/password.
    AuthFailed,
    /// Server returned a 4xx/5xx for a command.
    CommandRejected,
    /// Data channel could not be established (PASV/EPSV failed).
    DataChannelFailed,
    /// Transfer aborted, incomplete, or timed out.
    TransferFailed,
    /// Server sent an un-parseable response.
    ProtocolError,
    /// An I/O error on the local side (file read/write).
    IoError,
    /// Operation timed out.
    Timeout,
    /// Control connection dropped.
    Disconnected,
    /// Permission denied on the server.
    PermissionDenied,
    /// File/directory not found on the server.
    NotFound,
    /// Disk quota exceeded.
    QuotaExceeded,
    /// Caller-supplied path or argument is unusable.
    InvalidInput,
    /// Catch-all.
    Unknown,
}

pub type FtpResult<T> = Result<T, FtpError>;

// ── Construction helpers ─────────────────────────────────────────────

impl FtpError {
    pub fn new(kind: FtpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::ConnectionFailed, msg)
    }

    pub fn data_channel(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::DataChannelFailed, msg)
    }

    pub fn protocol_error(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::ProtocolError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::IoError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::Timeout, msg)
    }

    pub fn disconnected(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::Disconnected, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::InvalidInput, msg)
    }

    /// Classify an FTP reply code into the most appropriate error kind.
    ///
    /// `text` becomes the message verbatim, so the server's status line is
    /// what callers see.
    pub fn from_reply(code: u16, text: &str) -> Self {
        let kind = match code {
            421 => FtpErrorKind::Disconnected,
            425 | 426 => FtpErrorKind::DataChannelFailed,
            430 | 530 => FtpErrorKind::AuthFailed,
            450 | 550 => {
                let lower = text.to_lowercase();
                if lower.contains("permission") || lower.contains("denied") {
                    FtpErrorKind::PermissionDenied
                } else if lower.contains("not found") || lower.contains("no such") {
                    FtpErrorKind::NotFound
                } else if lower.contains("quota") {
                    FtpErrorKind::QuotaExceeded
                } else {
                    FtpErrorKind::CommandRejected
                }
            }
            451 | 452 | 552 => FtpErrorKind::TransferFailed,
            _ if code >= 400 => FtpErrorKind::CommandRejected,
            _ => FtpErrorKind::Unknown,
        };
        Self {
            kind,
            message: text.to_string(),
            code: Some(code),
        }
    }

    /// Whether the error carries a server reply.
    pub fn has_reply(&self) -> bool {
        self.code.is_some()
    }
}

impl fmt::Display for FtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "[FTP {:?} {}] {}", self.kind, code, self.message)
        } else {
            write!(f, "[FTP {:?}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FtpError {}

impl From<std::io::Error> for FtpError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::TimedOut {
            Self::timeout(format!("I/O timeout: {}", e))
        } else {
            Self::io_error(e.to_string())
        }
    }
}

impl From<FtpError> for Failure {
    fn from(e: FtpError) -> Self {
        Failure::transfer(e.code.map(i64::from), e.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sas_core::FailureDomain;

    #[test]
    fn reply_classification() {
        assert_eq!(FtpError::from_reply(530, "530 Login incorrect.").kind, FtpErrorKind::AuthFailed);
        assert_eq!(FtpError::from_reply(421, "421 Timeout").kind, FtpErrorKind::Disconnected);
        assert_eq!(FtpError::from_reply(425, "425 Can't open").kind, FtpErrorKind::DataChannelFailed);
        assert_eq!(
            FtpError::from_reply(550, "550 No such file or directory").kind,
            FtpErrorKind::NotFound
        );
        assert_eq!(
            FtpError::from_reply(550, "550 Permission denied").kind,
            FtpErrorKind::PermissionDenied
        );
        assert_eq!(FtpError::from_reply(552, "552 Exceeded").kind, FtpErrorKind::TransferFailed);
        assert_eq!(FtpError::from_reply(502, "502 Nope").kind, FtpErrorKind::CommandRejected);
    }

    #[test]
    fn reply_text_is_message() {
        let e = FtpError::from_reply(550, "550 Failed to open file.");
        assert_eq!(e.message, "550 Failed to open file.");
        assert_eq!(e.code, Some(550));
        assert!(e.has_reply());
        assert_eq!(e.to_string(), "[FTP NotFound 550] 550 Failed to open file.");
    }

    #[test]
    fn io_error_conversion() {
        let e: FtpError = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused").into();
        assert_eq!(e.kind, FtpErrorKind::IoError);
        assert!(!e.has_reply());

        let e: FtpError = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow").into();
        assert_eq!(e.kind, FtpErrorKind::Timeout);
    }

    #[test]
    fn failure_conversion_keeps_code() {
        let f: Failure = FtpError::from_reply(530, "530 Login incorrect.").into();
        assert_eq!(f.domain, FailureDomain::Transfer);
        assert_eq!(f.code, Some(530));
        assert_eq!(f.message, "530 Login incorrect.");
    }
}
