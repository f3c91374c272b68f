//! Command construction for the CRUD surface.
//!
//! Commands are plain strings with caller text spliced in verbatim; no
//! quoting or parameter binding happens here. Callers must not pass
//! untrusted input. The trait exists so a parameterised implementation can
//! replace [`LiteralQueryBuilder`] without touching [`DatabaseSession`].
//!
//! [`DatabaseSession`]: super::DatabaseSession

/// Turns (table, columns, values, condition) into command text.
pub trait QueryBuilder: Send + Sync {
    fn insert(&self, table: &str, columns: &[&str], values: &[&str]) -> String;
    fn update(&self, table: &str, columns: &[&str], values: &[&str], condition: Option<&str>) -> String;
    fn delete(&self, table: &str, condition: Option<&str>) -> String;
    fn select(&self, table: &str, condition: Option<&str>) -> String;
    /// Metadata query whose `Field` column lists the table's columns.
    fn table_columns(&self, table: &str) -> String;
}

/// Builds the historical literal command shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralQueryBuilder;

impl QueryBuilder for LiteralQueryBuilder {
    fn insert(&self, table: &str, columns: &[&str], values: &[&str]) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            values.join(", ")
        )
    }

    // Pairs are emitted as ` col='val'` with no comma between them, after
    // `UPDATE SET <table>`. Existing callers depend on this exact text.
    fn update(&self, table: &str, columns: &[&str], values: &[&str], condition: Option<&str>) -> String {
        let mut sql = format!("UPDATE SET {}", table);
        for (col, val) in columns.iter().zip(values) {
            sql.push_str(&format!(" {}='{}'", col, val));
        }
        if let Some(cond) = condition {
            sql.push_str(" WHERE ");
            sql.push_str(cond);
        }
        sql
    }

    fn delete(&self, table: &str, condition: Option<&str>) -> String {
        match condition {
            Some(cond) => format!("DELETE FROM {} WHERE {}", table, cond),
            None => format!("TRUNCATE TABLE {}", table),
        }
    }

    fn select(&self, table: &str, condition: Option<&str>) -> String {
        match condition {
            Some(cond) => format!("SELECT * FROM {} WHERE {}", table, cond),
            None => format!("SELECT * FROM {}", table),
        }
    }

    fn table_columns(&self, table: &str) -> String {
        format!("SHOW COLUMNS FROM {}", table)
    }
}
