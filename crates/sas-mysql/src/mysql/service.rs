//! MySQL session: `Disconnected -> connect -> Connected -> close -> Disconnected`.
//!
//! Every call returns an [`Outcome`]; driver errors are never propagated.
//! Calls made while disconnected are guarded no-ops that leave the
//! previous `Response::success` untouched.

use crate::mysql::backend::{MysqlBackend, SqlBackend};
use crate::mysql::query::{LiteralQueryBuilder, QueryBuilder};
use crate::mysql::types::*;
use log::{debug, info, warn};
use sas_core::{Failure, Outcome, Reachability};

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

pub const NOT_CONNECTED_MESSAGE: &str = "MySQL is not connected. Please call connect_database(db_name, username, password, port = 3306) first!";

const CANNOT_CONNECT_MESSAGE: &str = "Cannot connect to server.  Contact administrator";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username/password, please try again";

/// The facade's single database session.
pub struct DatabaseSession {
    host: String,
    backend: Box<dyn SqlBackend>,
    builder: Box<dyn QueryBuilder>,
    status: ConnectionStatus,
}

impl DatabaseSession {
    // ── Construction ────────────────────────────────────────────────

    pub fn new(host: impl Into<String>) -> Self {
        Self::with_backend(host, Box::new(MysqlBackend::new()))
    }

    pub fn with_backend(host: impl Into<String>, backend: Box<dyn SqlBackend>) -> Self {
        Self {
            host: host.into(),
            backend,
            builder: Box::new(LiteralQueryBuilder),
            status: ConnectionStatus::Disconnected,
        }
    }

    pub fn with_query_builder(mut self, builder: Box<dyn QueryBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    // ── Connect / close ─────────────────────────────────────────────

    /// Open the connection. Refused outright when the server failed the
    /// construction-time probe.
    pub async fn connect(
        &mut self,
        gate: &Reachability,
        db_name: &str,
        username: &str,
        password: &str,
        port: u16,
    ) -> Outcome<()> {
        if !gate.reachable {
            let status = format!(
                "Unable to connect to server. Contact server administrator! ({}).",
                gate.last_status
            );
            warn!("mysql connect refused: server {} unreachable", self.host);
            return Outcome::guarded(status, Some(false));
        }

        let descriptor = ConnectionDescriptor::new(&self.host, port, db_name, username, password);
        match self.backend.open(&descriptor).await {
            Ok(()) => {
                self.status = ConnectionStatus::Connected;
                info!("MySQL session open on {}:{}/{}", self.host, port, db_name);
                Outcome::success((), "Connected!")
            }
            Err(e) => {
                warn!("mysql connect failed: {}", e);
                Outcome::failed(connect_failure(e))
            }
        }
    }

    /// Close the connection. `value` says whether the close succeeded.
    pub async fn close(&mut self) -> Outcome<bool> {
        if !self.is_connected() {
            return Outcome::guarded(NOT_CONNECTED_MESSAGE, None);
        }
        match self.backend.close().await {
            Ok(()) => {
                self.status = ConnectionStatus::Disconnected;
                Outcome::success(true, "Disconnected")
            }
            Err(e) => {
                warn!("mysql close failed: {}", e);
                Outcome::failed(db_failure(e))
            }
        }
    }

    // ── CRUD ────────────────────────────────────────────────────────

    pub async fn insert(&mut self, table: &str, columns: &[&str], values: &[&str]) -> Outcome<u64> {
        if let Some(guard) = self.guard() {
            return guard;
        }
        if let Err(e) = check_pairs(columns, values) {
            return Outcome::failed(db_failure(e));
        }
        let sql = self.builder.insert(table, columns, values);
        self.execute(&sql).await
    }

    pub async fn update(
        &mut self,
        table: &str,
        columns: &[&str],
        values: &[&str],
        condition: Option<&str>,
    ) -> Outcome<u64> {
        if let Some(guard) = self.guard() {
            return guard;
        }
        if let Err(e) = check_pairs(columns, values) {
            return Outcome::failed(db_failure(e));
        }
        let sql = self.builder.update(table, columns, values, condition);
        self.execute(&sql).await
    }

    /// Without a condition the whole table is truncated.
    pub async fn delete(&mut self, table: &str, condition: Option<&str>) -> Outcome<u64> {
        if let Some(guard) = self.guard() {
            return guard;
        }
        let sql = self.builder.delete(table, condition);
        self.execute(&sql).await
    }

    /// Column-oriented select: one `Vec<String>` per table column, in the
    /// order the metadata query reports them, each holding every row's value.
    pub async fn select(&mut self, table: &str, condition: Option<&str>) -> Outcome<ColumnData> {
        if let Some(guard) = self.guard() {
            return guard;
        }

        let columns = match self.table_columns(table).await {
            Ok(c) => c,
            Err(e) => return Outcome::failed(db_failure(e)),
        };
        let mut data: ColumnData = vec![Vec::new(); columns.len()];

        let sql = self.builder.select(table, condition);
        debug!("mysql fetch: {}", sql);
        let result = match self.backend.fetch(&sql).await {
            Ok(r) => r,
            Err(e) => return Outcome::failed(db_failure(e)),
        };

        // Resolve each discovered column to its position in the result,
        // falling back to the discovered position.
        let positions: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| result.column_index(name).unwrap_or(i))
            .collect();

        for row in &result.rows {
            for (slot, &pos) in data.iter_mut().zip(&positions) {
                slot.push(row.get(pos).cloned().unwrap_or_default());
            }
        }

        let status = format!("{} row(s) returned", result.rows.len());
        Outcome::success(data, status)
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn guard<T: Default>(&self) -> Option<Outcome<T>> {
        if self.is_connected() {
            None
        } else {
            Some(Outcome::guarded(NOT_CONNECTED_MESSAGE, None))
        }
    }

    async fn execute(&mut self, sql: &str) -> Outcome<u64> {
        debug!("mysql execute: {}", sql);
        match self.backend.execute(sql).await {
            Ok(n) => Outcome::success(n, format!("{} row(s) affected", n)),
            Err(e) => {
                warn!("mysql statement failed: {}", e);
                Outcome::failed(db_failure(e))
            }
        }
    }

    async fn table_columns(&mut self, table: &str) -> Result<Vec<String>, MysqlError> {
        let sql = self.builder.table_columns(table);
        let meta = self.backend.fetch(&sql).await?;
        let field = meta.column_index("Field").unwrap_or(0);
        Ok(meta
            .rows
            .iter()
            .filter_map(|r| r.get(field).cloned())
            .collect())
    }
}

fn check_pairs(columns: &[&str], values: &[&str]) -> Result<(), MysqlError> {
    if columns.len() != values.len() {
        return Err(MysqlError::invalid("Column/value count mismatch"));
    }
    Ok(())
}

fn db_failure(e: MysqlError) -> Failure {
    Failure::database(e.code.map(i64::from), e.message)
}

/// Connect-time mapping of the two well-known error numbers.
fn connect_failure(e: MysqlError) -> Failure {
    let message = match e.code {
        Some(ER_CANNOT_CONNECT) => CANNOT_CONNECT_MESSAGE.to_string(),
        Some(ER_ACCESS_DENIED) => INVALID_CREDENTIALS_MESSAGE.to_string(),
        _ => e.message,
    };
    Failure::database(e.code.map(i64::from), message)
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mysql::backend::MockSqlBackend;
    use mockall::predicate::eq;
    use sas_core::Response;

    fn reachable() -> Reachability {
        Reachability { reachable: true, last_status: "Success".into() }
    }

    fn rows(columns: &[&str], rows: &[&[&str]]) -> RowSet {
        RowSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    async fn connected(mut mock: MockSqlBackend) -> DatabaseSession {
        mock.expect_open().times(1).returning(|_| Ok(()));
        let mut s = DatabaseSession::with_backend("127.0.0.1", Box::new(mock));
        assert!(s.connect(&reachable(), "db", "u", "p", DEFAULT_MYSQL_PORT).await.is_success());
        s
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let s = DatabaseSession::new("127.0.0.1");
        assert!(!s.is_connected());
        assert_eq!(s.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn unreachable_server_refuses_connect_without_touching_backend() {
        let mock = MockSqlBackend::new();
        let mut s = DatabaseSession::with_backend("10.0.0.1", Box::new(mock));
        let gate = Reachability { reachable: false, last_status: "TimedOut".into() };
        let out = s.connect(&gate, "db", "u", "p", 3306).await;
        assert!(!out.is_success());
        assert!(out.status().contains("TimedOut"));
        assert!(!s.is_connected());
    }

    #[tokio::test]
    async fn connect_success_sets_connected() {
        let s = connected(MockSqlBackend::new()).await;
        assert!(s.is_connected());
    }

    #[tokio::test]
    async fn connect_uses_descriptor_fields() {
        let mut mock = MockSqlBackend::new();
        mock.expect_open()
            .withf(|d: &ConnectionDescriptor| {
                d.server == "127.0.0.1" && d.port == 3307 && d.database == "shop" && d.uid == "app"
            })
            .times(1)
            .returning(|_| Ok(()));
        let mut s = DatabaseSession::with_backend("127.0.0.1", Box::new(mock));
        let mut resp = Response::default();
        s.connect(&reachable(), "shop", "app", "pw", 3307).await.record(&mut resp);
        assert!(resp.success);
        assert_eq!(resp.status, "Connected!");
    }

    #[tokio::test]
    async fn connect_maps_access_denied() {
        let mut mock = MockSqlBackend::new();
        mock.expect_open()
            .returning(|_| Err(MysqlError::from_server(1045, "Access denied for user 'u'@'h'")));
        let mut s = DatabaseSession::with_backend("h", Box::new(mock));
        let out = s.connect(&reachable(), "db", "u", "bad", 3306).await;
        assert_eq!(out.status(), INVALID_CREDENTIALS_MESSAGE);
        assert!(!s.is_connected());
    }

    #[tokio::test]
    async fn connect_maps_unreachable_driver() {
        let mut mock = MockSqlBackend::new();
        mock.expect_open()
            .returning(|_| Err(MysqlError::connection("Connection refused (os error 111)")));
        let mut s = DatabaseSession::with_backend("h", Box::new(mock));
        let out = s.connect(&reachable(), "db", "u", "p", 3306).await;
        assert_eq!(out.status(), CANNOT_CONNECT_MESSAGE);
    }

    #[tokio::test]
    async fn connect_passes_other_errors_through() {
        let mut mock = MockSqlBackend::new();
        mock.expect_open()
            .returning(|_| Err(MysqlError::from_server(1049, "Unknown database 'nope'")));
        let mut s = DatabaseSession::with_backend("h", Box::new(mock));
        let out = s.connect(&reachable(), "nope", "u", "p", 3306).await;
        assert_eq!(out.status(), "Unknown database 'nope'");
        assert_eq!(out.failure().and_then(|f| f.code), Some(1049));
    }

    #[tokio::test]
    async fn crud_while_disconnected_is_guarded() {
        let mut s = DatabaseSession::with_backend("h", Box::new(MockSqlBackend::new()));
        let mut resp = Response::new(true, "previous");

        assert_eq!(s.insert("t", &["a"], &["1"]).await.record(&mut resp), 0);
        assert_eq!(resp.status, NOT_CONNECTED_MESSAGE);
        assert!(resp.success);

        assert_eq!(s.update("t", &["a"], &["1"], None).await.record(&mut resp), 0);
        assert_eq!(s.delete("t", None).await.record(&mut resp), 0);
        assert!(s.select("t", None).await.record(&mut resp).is_empty());
        assert!(!s.close().await.record(&mut resp));
        assert_eq!(resp.status, NOT_CONNECTED_MESSAGE);
        assert!(resp.success);
    }

    #[tokio::test]
    async fn insert_executes_literal_command() {
        let mut mock = MockSqlBackend::new();
        mock.expect_execute()
            .with(eq("INSERT INTO t (a, b) VALUES (1, 'x')"))
            .times(1)
            .returning(|_| Ok(1));
        let mut s = connected(mock).await;
        let out = s.insert("t", &["a", "b"], &["1", "'x'"]).await;
        assert!(out.is_success());
        assert_eq!(*out.value(), 1);
        assert_eq!(out.status(), "1 row(s) affected");
    }

    #[tokio::test]
    async fn insert_rejects_mismatched_pairs() {
        let mut s = connected(MockSqlBackend::new()).await;
        let out = s.insert("t", &["a", "b"], &["1"]).await;
        assert_eq!(*out.value(), 0);
        assert_eq!(out.status(), "Column/value count mismatch");
    }

    #[tokio::test]
    async fn update_failure_reports_driver_message() {
        let mut mock = MockSqlBackend::new();
        mock.expect_execute()
            .returning(|_| Err(MysqlError::from_server(1064, "You have an error in your SQL syntax")));
        let mut s = connected(mock).await;
        let mut resp = Response::new(true, "Connected!");
        let n = s.update("t", &["a"], &["1"], Some("id=1")).await.record(&mut resp);
        assert_eq!(n, 0);
        assert!(!resp.success);
        assert_eq!(resp.status, "You have an error in your SQL syntax");
    }

    #[tokio::test]
    async fn delete_without_condition_truncates() {
        let mut mock = MockSqlBackend::new();
        mock.expect_execute()
            .with(eq("TRUNCATE TABLE logs"))
            .times(1)
            .returning(|_| Ok(0));
        let mut s = connected(mock).await;
        assert!(s.delete("logs", None).await.is_success());
    }

    #[tokio::test]
    async fn select_aligns_values_by_column() {
        let mut mock = MockSqlBackend::new();
        mock.expect_fetch()
            .with(eq("SHOW COLUMNS FROM users"))
            .times(1)
            .returning(|_| {
                Ok(rows(
                    &["Field", "Type"],
                    &[&["id", "int"], &["name", "varchar(20)"], &["age", "int"]],
                ))
            });
        mock.expect_fetch()
            .with(eq("SELECT * FROM users WHERE age > 1"))
            .times(1)
            .returning(|_| {
                Ok(rows(
                    &["id", "name", "age"],
                    &[&["1", "ann", "31"], &["2", "bob", "NULL"]],
                ))
            });
        let mut s = connected(mock).await;
        let out = s.select("users", Some("age > 1")).await;
        assert_eq!(out.status(), "2 row(s) returned");
        let data = out.into_value();
        assert_eq!(data.len(), 3);
        assert!(data.iter().all(|c| c.len() == 2));
        assert_eq!(data[0], vec!["1", "2"]);
        assert_eq!(data[1], vec!["ann", "bob"]);
        assert_eq!(data[2], vec!["31", "NULL"]);
    }

    #[tokio::test]
    async fn select_empty_table_keeps_column_count() {
        let mut mock = MockSqlBackend::new();
        mock.expect_fetch()
            .with(eq("SHOW COLUMNS FROM t"))
            .returning(|_| Ok(rows(&["Field"], &[&["a"], &["b"]])));
        mock.expect_fetch()
            .with(eq("SELECT * FROM t"))
            .returning(|_| Ok(RowSet::default()));
        let mut s = connected(mock).await;
        let data = s.select("t", None).await.into_value();
        assert_eq!(data, vec![Vec::<String>::new(), Vec::new()]);
    }

    #[tokio::test]
    async fn select_error_returns_empty() {
        let mut mock = MockSqlBackend::new();
        mock.expect_fetch()
            .returning(|_| Err(MysqlError::from_server(1146, "Table 'db.nope' doesn't exist")));
        let mut s = connected(mock).await;
        let mut resp = Response::default();
        let data = s.select("nope", None).await.record(&mut resp);
        assert!(data.is_empty());
        assert!(!resp.success);
        assert_eq!(resp.status, "Table 'db.nope' doesn't exist");
    }

    #[tokio::test]
    async fn close_resets_state() {
        let mut mock = MockSqlBackend::new();
        mock.expect_close().times(1).returning(|| Ok(()));
        let mut s = connected(mock).await;
        let out = s.close().await;
        assert!(*out.value());
        assert!(!s.is_connected());
    }

    #[tokio::test]
    async fn close_failure_keeps_connected() {
        let mut mock = MockSqlBackend::new();
        mock.expect_close()
            .returning(|| Err(MysqlError::query("Lost connection to MySQL server")));
        let mut s = connected(mock).await;
        let out = s.close().await;
        assert!(!*out.value());
        assert_eq!(out.status(), "Lost connection to MySQL server");
        assert!(s.is_connected());
    }

    struct Quoting;
    impl QueryBuilder for Quoting {
        fn insert(&self, table: &str, _: &[&str], _: &[&str]) -> String { format!("INSERT `{}`", table) }
        fn update(&self, table: &str, _: &[&str], _: &[&str], _: Option<&str>) -> String { format!("UPDATE `{}`", table) }
        fn delete(&self, table: &str, _: Option<&str>) -> String { format!("DELETE `{}`", table) }
        fn select(&self, table: &str, _: Option<&str>) -> String { format!("SELECT `{}`", table) }
        fn table_columns(&self, table: &str) -> String { format!("COLUMNS `{}`", table) }
    }

    #[tokio::test]
    async fn query_builder_is_replaceable() {
        let mut mock = MockSqlBackend::new();
        mock.expect_open().returning(|_| Ok(()));
        mock.expect_execute()
            .with(eq("DELETE `t`"))
            .times(1)
            .returning(|_| Ok(4));
        let mut s = DatabaseSession::with_backend("h", Box::new(mock))
            .with_query_builder(Box::new(Quoting));
        s.connect(&reachable(), "db", "u", "p", 3306).await;
        assert_eq!(*s.delete("t", Some("x")).await.value(), 4);
    }
}
