//! `sqlx` implementation of the connection seams.
//!
//! Connections are opened through the `Any` driver, so the same code talks
//! to MySQL in production and to SQLite in tests. Both backends use `?`
//! placeholders, which keeps the statement templates backend-neutral.

use std::fmt;

use async_trait::async_trait;
use sqlx::{Any, AnyConnection, Connection as _};

use super::pool::{Connection, Connector};
use super::statement::{Param, Statement, WriteOutcome};
use crate::config::ConfigError;
use crate::domain::Record;
use crate::error::{AcquireError, StatementError};

/// Column tuple decoded from `SELECT id, f_name, l_name, email, phone`.
type RecordRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// SQL flavor behind a database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `mysql://` URLs.
    MySql,
    /// `sqlite:` URLs.
    Sqlite,
}

impl Dialect {
    /// Detects the dialect from the URL scheme.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Some(Self::MySql)
        } else if url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }
}

/// Opens `sqlx` connections to one database URL.
#[derive(Clone)]
pub struct SqlConnector {
    url: String,
    dialect: Dialect,
}

impl SqlConnector {
    /// Creates a connector for `url`. Nothing is opened yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedDatabase`] if the URL scheme is
    /// neither MySQL nor SQLite.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let dialect = Dialect::from_url(&url).ok_or_else(|| {
            let scheme = url.split(':').next().unwrap_or_default().to_string();
            ConfigError::UnsupportedDatabase(scheme)
        })?;
        sqlx::any::install_default_drivers();
        Ok(Self { url, dialect })
    }

    /// Dialect of the target database.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }
}

// The URL carries credentials.
impl fmt::Debug for SqlConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlConnector")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connector for SqlConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, AcquireError> {
        let inner = AnyConnection::connect(&self.url)
            .await
            .map_err(|e| AcquireError::Connect(e.to_string()))?;
        Ok(Box::new(SqlConnection {
            inner,
            dialect: self.dialect,
        }))
    }
}

/// One open `sqlx` connection.
pub struct SqlConnection {
    inner: AnyConnection,
    dialect: Dialect,
}

impl fmt::Debug for SqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlConnection")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connection for SqlConnection {
    async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>, StatementError> {
        let mut query = sqlx::query_as::<Any, RecordRow>(statement.sql());
        for param in statement.params() {
            query = match param {
                Param::Int(value) => query.bind(*value),
                Param::Text(value) => query.bind(value.clone()),
            };
        }
        let rows = query
            .fetch_all(&mut self.inner)
            .await
            .map_err(statement_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, f_name, l_name, email, phone)| Record {
                id,
                f_name,
                l_name,
                email,
                phone,
            })
            .collect())
    }

    async fn execute(&mut self, statement: &Statement) -> Result<WriteOutcome, StatementError> {
        let mut query = sqlx::query::<Any>(statement.sql());
        for param in statement.params() {
            query = match param {
                Param::Int(value) => query.bind(*value),
                Param::Text(value) => query.bind(value.clone()),
            };
        }
        let done = query
            .execute(&mut self.inner)
            .await
            .map_err(statement_error)?;

        Ok(WriteOutcome {
            rows_affected: done.rows_affected(),
            last_insert_id: done.last_insert_id(),
        })
    }

    async fn close(self: Box<Self>) {
        if let Err(err) = self.inner.close().await {
            tracing::debug!(error = %err, "error closing database connection");
        }
    }
}

fn statement_error(err: sqlx::Error) -> StatementError {
    match err {
        sqlx::Error::Database(db) => StatementError::Database(db.message().to_string()),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => StatementError::ConnectionLost(err.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. } => StatementError::Decode(err.to_string()),
        other => StatementError::Database(other.to_string()),
    }
}
