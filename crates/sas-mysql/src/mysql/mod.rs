mod types;
mod query;
mod backend;
mod service;

pub use types::*;
pub use query::{LiteralQueryBuilder, QueryBuilder};
pub use backend::{MysqlBackend, SqlBackend};
pub use service::{DatabaseSession, DEFAULT_MYSQL_PORT, NOT_CONNECTED_MESSAGE};
