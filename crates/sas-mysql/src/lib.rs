//! # sas-mysql
//!
//! Database half of the server facade.
//!
//! - `types` - errors, connection descriptor, row sets
//! - `query` - [`QueryBuilder`] and the literal-string implementation
//! - `backend` - [`SqlBackend`] seam and the sqlx-backed [`MysqlBackend`]
//! - `service` - [`DatabaseSession`], the guarded CRUD surface

pub mod mysql;

pub use mysql::*;
