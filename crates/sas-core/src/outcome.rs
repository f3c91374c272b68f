//! The shared response slot and the tagged result each session returns.
//!
//! Sessions never write into [`Response`] directly. They hand back an
//! [`Outcome`] and the facade calls [`Outcome::record`], which is the only
//! place the "last status" contract is applied.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Response ────────────────────────────────────────────────────────

/// Last-result slot owned by the facade. Overwritten by every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub status: String,
}

impl Response {
    pub fn new(success: bool, status: impl Into<String>) -> Self {
        Self {
            success,
            status: status.into(),
        }
    }
}

// ── Failures ────────────────────────────────────────────────────────

/// Which collaborator produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureDomain {
    Reachability,
    Database,
    Transfer,
}

impl fmt::Display for FailureDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reachability => "reachability",
            Self::Database => "database",
            Self::Transfer => "transfer",
        };
        write!(f, "{}", s)
    }
}

/// A driver or transport error flattened to data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub domain: FailureDomain,
    /// Driver error number or FTP reply code, when one exists.
    pub code: Option<i64>,
    pub message: String,
}

impl Failure {
    pub fn new(domain: FailureDomain, code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            domain,
            code,
            message: message.into(),
        }
    }

    pub fn database(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::new(FailureDomain::Database, code, message)
    }

    pub fn transfer(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::new(FailureDomain::Transfer, code, message)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{} {}] {}", self.domain, code, self.message),
            None => write!(f, "[{}] {}", self.domain, self.message),
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Result of one facade operation.
///
/// `value` is what the caller gets back (row count, column data, ...). On
/// anything but `Success` it is the harmless empty/zero value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The network or database action completed.
    Success { value: T, status: String },
    /// The collaborator reported an error.
    Failure { value: T, failure: Failure },
    /// A precondition was missing and nothing was attempted.
    ///
    /// `success: None` leaves the previous `Response::success` in place.
    Precondition {
        value: T,
        status: String,
        success: Option<bool>,
    },
}

impl<T> Outcome<T> {
    pub fn success(value: T, status: impl Into<String>) -> Self {
        Self::Success {
            value,
            status: status.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Success { status, .. } | Self::Precondition { status, .. } => status,
            Self::Failure { failure, .. } => &failure.message,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Success { value, .. }
            | Self::Failure { value, .. }
            | Self::Precondition { value, .. } => value,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure { failure, .. } => Some(failure),
            _ => None,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Success { value, .. }
            | Self::Failure { value, .. }
            | Self::Precondition { value, .. } => value,
        }
    }

    /// Write this outcome into the shared slot and hand back the value.
    pub fn record(self, response: &mut Response) -> T {
        match self {
            Self::Success { value, status } => {
                response.success = true;
                response.status = status;
                value
            }
            Self::Failure { value, failure } => {
                response.success = false;
                response.status = failure.message;
                value
            }
            Self::Precondition {
                value,
                status,
                success,
            } => {
                if let Some(s) = success {
                    response.success = s;
                }
                response.status = status;
                value
            }
        }
    }
}

impl<T: Default> Outcome<T> {
    pub fn failed(failure: Failure) -> Self {
        Self::Failure {
            value: T::default(),
            failure,
        }
    }

    pub fn guarded(status: impl Into<String>, success: Option<bool>) -> Self {
        Self::Precondition {
            value: T::default(),
            status: status.into(),
            success,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
