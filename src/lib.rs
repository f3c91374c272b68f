//! # sas-server
//!
//! One object, [`ServerFacade`], that probes a fixed server once at
//! construction and then offers MySQL CRUD and FTP transfers against it.
//! Every call reports through a single shared [`Response`] slot as well as
//! through its return value.
//!
//! The facade is blocking and single-owner: it drives the async sessions on
//! a private current-thread runtime, and every mutating call takes
//! `&mut self`.

pub mod config;
pub mod error;
pub mod facade;
pub mod logging;

pub use config::ServerConfig;
pub use error::{ConfigError, FacadeError};
pub use facade::{ServerFacade, ServerFacadeBuilder};

pub use sas_core::{Failure, FailureDomain, Outcome, PingReply, Reachability, Response};
pub use sas_ftp::{DataChannelMode, TransferOptions, DEFAULT_FTP_PORT};
pub use sas_mysql::{ColumnData, QueryBuilder, SqlBackend, DEFAULT_MYSQL_PORT};
pub use sas_network::{Pinger, DEFAULT_PING_TIMEOUT_SECS};
