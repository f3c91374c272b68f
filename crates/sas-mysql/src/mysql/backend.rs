//! Driver seam: one open connection, literal command execution.

use crate::mysql::types::*;
use async_trait::async_trait;
use log::{debug, info};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row, ValueRef};

/// What [`DatabaseSession`](super::DatabaseSession) needs from a SQL driver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlBackend: Send {
    /// Open the connection, replacing any previous one.
    async fn open(&mut self, descriptor: &ConnectionDescriptor) -> Result<(), MysqlError>;
    /// Run a statement that returns no rows; yields the affected-row count.
    async fn execute(&mut self, sql: &str) -> Result<u64, MysqlError>;
    /// Run a statement and render every cell as text.
    async fn fetch(&mut self, sql: &str) -> Result<RowSet, MysqlError>;
    async fn close(&mut self) -> Result<(), MysqlError>;
}

/// sqlx-backed [`SqlBackend`] holding a single `MySqlConnection`.
#[derive(Default)]
pub struct MysqlBackend {
    conn: Option<MySqlConnection>,
}

impl MysqlBackend {
    pub fn new() -> Self {
        Self { conn: None }
    }

    fn conn_mut(&mut self) -> Result<&mut MySqlConnection, MysqlError> {
        self.conn.as_mut().ok_or_else(MysqlError::not_connected)
    }
}

#[async_trait]
impl SqlBackend for MysqlBackend {
    async fn open(&mut self, descriptor: &ConnectionDescriptor) -> Result<(), MysqlError> {
        if let Some(old) = self.conn.take() {
            let _ = old.close().await;
        }

        let options = MySqlConnectOptions::new()
            .host(&descriptor.server)
            .port(descriptor.port)
            .database(&descriptor.database)
            .username(&descriptor.uid)
            .password(&descriptor.password);

        debug!(
            "mysql connect (password masked): {}:{}/{} as {}",
            descriptor.server, descriptor.port, descriptor.database, descriptor.uid
        );
        let conn = options.connect().await?;
        info!("MySQL connected to {}:{}", descriptor.server, descriptor.port);
        self.conn = Some(conn);
        Ok(())
    }

    // A bare `&str` goes through the text protocol, which is what lets
    // every column be read back as a string below.
    async fn execute(&mut self, sql: &str) -> Result<u64, MysqlError> {
        let conn = self.conn_mut()?;
        let result = conn.execute(sql).await?;
        Ok(result.rows_affected())
    }

    async fn fetch(&mut self, sql: &str) -> Result<RowSet, MysqlError> {
        let conn = self.conn_mut()?;
        let rows = conn.fetch_all(sql).await?;

        let columns = rows
            .first()
            .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows.iter().map(render_row).collect();
        Ok(RowSet { columns, rows })
    }

    async fn close(&mut self) -> Result<(), MysqlError> {
        match self.conn.take() {
            Some(conn) => {
                conn.close().await?;
                info!("MySQL connection closed");
                Ok(())
            }
            None => Err(MysqlError::not_connected()),
        }
    }
}

/// Render a text-protocol row cell by cell.
fn render_row(row: &MySqlRow) -> Vec<String> {
    (0..row.len()).map(|i| render_cell(row, i)).collect()
}

fn render_cell(row: &MySqlRow, index: usize) -> String {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return "NULL".to_string(),
        Err(_) => return "NULL".to_string(),
        _ => {}
    }
    row.try_get_unchecked::<String, _>(index)
        .or_else(|_| {
            row.try_get_unchecked::<Vec<u8>, _>(index)
                .map(|b| String::from_utf8_lossy(&b).into_owned())
        })
        .unwrap_or_default()
}
