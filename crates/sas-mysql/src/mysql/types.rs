//! Types for the MySQL session crate.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Errors ──────────────────────────────────────────────────────────

/// Server error number for "Access denied for user".
pub const ER_ACCESS_DENIED: u16 = 1045;
/// Number used for failures that never reached the server.
pub const ER_CANNOT_CONNECT: u16 = 0;

/// Error kinds specific to MySQL operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MysqlErrorKind {
    Connection,
    Authentication,
    Query,
    NotConnected,
    InvalidInput,
    Internal,
}

impl fmt::Display for MysqlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connection => "connection",
            Self::Authentication => "authentication",
            Self::Query => "query",
            Self::NotConnected => "not_connected",
            Self::InvalidInput => "invalid_input",
            Self::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MysqlError {
    pub kind: MysqlErrorKind,
    /// Server error number (`1045`, `1146`, ...) or `0` when the server was
    /// never reached.
    pub code: Option<u16>,
    pub message: String,
}

impl MysqlError {
    pub fn new(kind: MysqlErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, code: None, message: msg.into() }
    }
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(MysqlErrorKind::Connection, msg).with_code(ER_CANNOT_CONNECT)
    }
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(MysqlErrorKind::Authentication, msg).with_code(ER_ACCESS_DENIED)
    }
    pub fn query(msg: impl Into<String>) -> Self { Self::new(MysqlErrorKind::Query, msg) }
    pub fn not_connected() -> Self { Self::new(MysqlErrorKind::NotConnected, "No active MySQL connection") }
    pub fn invalid(msg: impl Into<String>) -> Self { Self::new(MysqlErrorKind::InvalidInput, msg) }

    /// Classify a server-side error by its error number.
    pub fn from_server(number: u16, msg: impl Into<String>) -> Self {
        let kind = match number {
            ER_ACCESS_DENIED => MysqlErrorKind::Authentication,
            _ => MysqlErrorKind::Query,
        };
        Self::new(kind, msg).with_code(number)
    }
}

impl fmt::Display for MysqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[mysql:{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for MysqlError {}

impl From<sqlx::Error> for MysqlError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) => {
                let number = db
                    .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                    .map(|m| m.number());
                match number {
                    Some(n) => Self::from_server(n, db.message()),
                    None => Self::query(db.message()),
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::connection(e.to_string()),
            other => Self::query(other.to_string()),
        }
    }
}

// ── Connection descriptor ───────────────────────────────────────────

/// Fields of a `SERVER=..;PORT=..;DATABASE=..;UID=..;PASSWORD=..;` string.
#[derive(Clone, PartialEq)]
pub struct ConnectionDescriptor {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub uid: String,
    pub password: String,
}

impl ConnectionDescriptor {
    pub fn new(server: &str, port: u16, database: &str, uid: &str, password: &str) -> Self {
        Self {
            server: server.into(),
            port,
            database: database.into(),
            uid: uid.into(),
            password: password.into(),
        }
    }

    /// Render the classic connection string.
    pub fn to_connection_string(&self) -> String {
        format!(
            "SERVER={};PORT={};DATABASE={};UID={};PASSWORD={};",
            self.server, self.port, self.database, self.uid, self.password
        )
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("uid", &self.uid)
            .field("password", &"***")
            .finish()
    }
}

// ── Query results ───────────────────────────────────────────────────

/// Text rendering of a result set, one `Vec<String>` per row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RowSet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Values of one select, one `Vec<String>` per discovered column.
pub type ColumnData = Vec<Vec<String>>;

// ── Session state ───────────────────────────────────────────────────

/// Status of the MySQL connection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
