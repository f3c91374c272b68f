//! The composition root.
//!
//! Construction probes the configured address once and remembers whether it
//! answered. Database calls are gated on that answer; transfer calls are
//! not. Every operation records its outcome into the shared [`Response`]
//! before returning.

use crate::config::ServerConfig;
use crate::error::FacadeError;
use sas_core::{PingReply, Reachability, Response};
use sas_ftp::TransferSession;
use sas_mysql::{ColumnData, DatabaseSession, QueryBuilder, SqlBackend};
use sas_network::{AvailabilityProbe, Pinger};
use std::path::Path;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Single-session facade over the probe, the database and the transfer
/// session.
///
/// Not meant to be shared between threads; every call blocks until the
/// underlying network round trip finishes. Do not call it from inside
/// another Tokio runtime.
pub struct ServerFacade {
    id: Uuid,
    runtime: Runtime,
    probe: AvailabilityProbe,
    reachability: Reachability,
    database: DatabaseSession,
    transfer: TransferSession,
    response: Response,
}

/// Builder for swapping the collaborators behind the facade.
pub struct ServerFacadeBuilder {
    config: ServerConfig,
    pinger: Option<Box<dyn Pinger>>,
    sql_backend: Option<Box<dyn SqlBackend>>,
    query_builder: Option<Box<dyn QueryBuilder>>,
}

impl ServerFacadeBuilder {
    pub fn pinger(mut self, pinger: Box<dyn Pinger>) -> Self {
        self.pinger = Some(pinger);
        self
    }

    pub fn sql_backend(mut self, backend: Box<dyn SqlBackend>) -> Self {
        self.sql_backend = Some(backend);
        self
    }

    pub fn query_builder(mut self, builder: Box<dyn QueryBuilder>) -> Self {
        self.query_builder = Some(builder);
        self
    }

    /// Start the runtime and run the one construction-time probe.
    pub fn build(self) -> Result<ServerFacade, FacadeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let probe = match self.pinger {
            Some(pinger) => AvailabilityProbe::with_pinger(self.config.target, pinger),
            None => AvailabilityProbe::new(self.config.target),
        };
        let host = probe.host_string();

        let mut database = match self.sql_backend {
            Some(backend) => DatabaseSession::with_backend(host.clone(), backend),
            None => DatabaseSession::new(host.clone()),
        };
        if let Some(builder) = self.query_builder {
            database = database.with_query_builder(builder);
        }

        let transfer = TransferSession::new(
            host.clone(),
            self.config.remote_path.clone(),
            self.config.transfer.clone(),
        );

        let mut facade = ServerFacade {
            id: Uuid::new_v4(),
            runtime,
            probe,
            reachability: Reachability::default(),
            database,
            transfer,
            response: Response::default(),
        };

        let reply = facade.run_ping(self.config.ping_timeout_secs);
        facade.reachability.reachable = reply.success;
        info!(
            facade = %facade.id,
            host = %host,
            reachable = reply.success,
            status = %reply.status,
            "server facade ready"
        );
        Ok(facade)
    }
}

impl ServerFacade {
    // ── Construction ────────────────────────────────────────────────

    /// Facade against the default target.
    pub fn new() -> Result<Self, FacadeError> {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Result<Self, FacadeError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ServerConfig) -> ServerFacadeBuilder {
        ServerFacadeBuilder {
            config,
            pinger: None,
            sql_backend: None,
            query_builder: None,
        }
    }

    // ── State ───────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Outcome of the most recent call.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Whether the construction-time probe succeeded.
    pub fn is_reachable(&self) -> bool {
        self.reachability.reachable
    }

    pub fn reachability(&self) -> &Reachability {
        &self.reachability
    }

    pub fn is_database_connected(&self) -> bool {
        self.database.is_connected()
    }

    pub fn is_transfer_connected(&self) -> bool {
        self.transfer.is_connected()
    }

    pub fn host(&self) -> String {
        self.probe.host_string()
    }

    pub fn remote_path(&self) -> &str {
        self.transfer.remote_path()
    }

    pub fn set_remote_path(&mut self, path: impl Into<String>) {
        self.transfer.set_remote_path(path);
    }

    // ── Availability ────────────────────────────────────────────────

    /// Send one echo request. Overwrites `Response.status` (not `success`)
    /// and the remembered last status; `is_reachable` is left alone.
    pub fn run_ping(&mut self, timeout_secs: u64) -> PingReply {
        let reply = self.runtime.block_on(self.probe.probe(timeout_secs));
        debug!(facade = %self.id, status = %reply.status, rtt_ms = reply.roundtrip_time_millis, "ping");
        self.response.status = reply.status.clone();
        self.reachability.last_status = reply.status.clone();
        reply
    }

    // ── Database ────────────────────────────────────────────────────

    pub fn connect_database(&mut self, db_name: &str, username: &str, password: &str, port: u16) -> Response {
        let outcome = self.runtime.block_on(self.database.connect(
            &self.reachability,
            db_name,
            username,
            password,
            port,
        ));
        if !outcome.is_success() {
            warn!(facade = %self.id, status = %outcome.status(), "database connect failed");
        }
        outcome.record(&mut self.response);
        self.response.clone()
    }

    /// Insert one row; returns the affected-row count.
    pub fn insert(&mut self, table: &str, columns: &[&str], values: &[&str]) -> u64 {
        let outcome = self.runtime.block_on(self.database.insert(table, columns, values));
        outcome.record(&mut self.response)
    }

    pub fn update(&mut self, table: &str, columns: &[&str], values: &[&str], condition: Option<&str>) -> u64 {
        let outcome = self
            .runtime
            .block_on(self.database.update(table, columns, values, condition));
        outcome.record(&mut self.response)
    }

    /// `None` clears the whole table.
    pub fn delete(&mut self, table: &str, condition: Option<&str>) -> u64 {
        let outcome = self.runtime.block_on(self.database.delete(table, condition));
        outcome.record(&mut self.response)
    }

    /// One sequence per column, each holding every row's value.
    pub fn select(&mut self, table: &str, condition: Option<&str>) -> ColumnData {
        let outcome = self.runtime.block_on(self.database.select(table, condition));
        outcome.record(&mut self.response)
    }

    /// Returns whether the close succeeded.
    pub fn close_database(&mut self) -> bool {
        let outcome = self.runtime.block_on(self.database.close());
        outcome.record(&mut self.response)
    }

    // ── Transfer ────────────────────────────────────────────────────

    pub fn connect_transfer(&mut self, username: &str, password: &str, port: u16) -> Response {
        let outcome = self
            .runtime
            .block_on(self.transfer.connect(username, password, port));
        if !outcome.is_success() {
            warn!(facade = %self.id, status = %outcome.status(), "transfer connect failed");
        }
        outcome.record(&mut self.response);
        self.response.clone()
    }

    pub fn upload(&mut self, local_file: impl AsRef<Path>, subpath: Option<&str>) -> Response {
        let outcome = self
            .runtime
            .block_on(self.transfer.upload(local_file.as_ref(), subpath));
        outcome.record(&mut self.response);
        self.response.clone()
    }

    pub fn download(&mut self, remote_relative_path: &str) -> Response {
        let outcome = self
            .runtime
            .block_on(self.transfer.download(remote_relative_path));
        outcome.record(&mut self.response);
        self.response.clone()
    }
}
