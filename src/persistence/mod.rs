//! Persistence layer: bounded connection pool and statement execution.
//!
//! [`pool::ConnectionPool`] owns the connection slots. The
//! [`pool::Connector`] and [`pool::Connection`] traits are the seam between
//! the pool and a database driver; [`sql`] implements them with `sqlx`.

pub mod pool;
pub mod schema;
pub mod sql;
pub mod statement;

pub use pool::{Connection, ConnectionPool, Connector, PoolOptions, PoolStatus, PooledConnection};
pub use sql::{Dialect, SqlConnector};
pub use statement::{Param, Statement, WriteOutcome};
