//! Record service: one pooled statement per operation.

use crate::domain::{Entity, Lookup, Record, RecordFields};
use crate::error::ServiceError;
use crate::persistence::{ConnectionPool, Param, PooledConnection, Statement, WriteOutcome};

/// Runs the operations of one entity's service against the pool.
///
/// Every operation follows the same pattern: acquire a connection → run
/// exactly one statement → release the connection → interpret the result.
/// The connection is back in the pool before the caller sees the outcome.
#[derive(Debug, Clone)]
pub struct RecordService {
    pool: ConnectionPool,
    entity: Entity,
}

impl RecordService {
    /// Creates a service for `entity` over `pool`.
    #[must_use]
    pub fn new(pool: ConnectionPool, entity: Entity) -> Self {
        Self { pool, entity }
    }

    /// The entity this service exposes.
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// The shared connection pool.
    #[must_use]
    pub const fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Returns every row of the table.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Acquisition`] or [`ServiceError::Statement`].
    pub async fn list(&self) -> Result<Vec<Record>, ServiceError> {
        self.read(Statement::select_all(self.entity)).await
    }

    /// Returns the rows matching `lookup` with the given bound values.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Acquisition`] or [`ServiceError::Statement`].
    pub async fn find(&self, lookup: &Lookup, values: Vec<Param>) -> Result<Vec<Record>, ServiceError> {
        self.read(Statement::select_where(self.entity, lookup.columns(), values))
            .await
    }

    /// Inserts a row and returns its generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Acquisition`] or [`ServiceError::Statement`].
    pub async fn create(&self, fields: &RecordFields) -> Result<Option<i64>, ServiceError> {
        let outcome = self.write(Statement::insert(self.entity, fields)).await?;
        tracing::info!(entity = %self.entity, id = ?outcome.last_insert_id, "record created");
        Ok(outcome.last_insert_id)
    }

    /// Overwrites every attribute of the row `id` and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if no row has identifier `id`,
    /// otherwise [`ServiceError::Acquisition`] or [`ServiceError::Statement`].
    pub async fn update(&self, id: i64, fields: RecordFields) -> Result<Record, ServiceError> {
        let outcome = self.write(Statement::update(self.entity, id, &fields)).await?;
        if outcome.rows_affected == 0 {
            return Err(ServiceError::NotFound(self.entity));
        }
        Ok(Record::new(id, fields))
    }

    /// Deletes the row `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if no row has identifier `id`,
    /// otherwise [`ServiceError::Acquisition`] or [`ServiceError::Statement`].
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let outcome = self.write(Statement::delete(self.entity, id)).await?;
        if outcome.rows_affected == 0 {
            return Err(ServiceError::NotFound(self.entity));
        }
        tracing::info!(entity = %self.entity, id, "record deleted");
        Ok(())
    }

    /// Acquires and immediately releases a connection.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::HealthCheck`] if no connection can be acquired.
    pub async fn check_connectivity(&self) -> Result<(), ServiceError> {
        let conn = self.pool.acquire().await.map_err(|err| {
            tracing::error!(entity = %self.entity, error = %err, "health check could not acquire a connection");
            ServiceError::HealthCheck(err)
        })?;
        conn.release();
        Ok(())
    }

    async fn read(&self, statement: Statement) -> Result<Vec<Record>, ServiceError> {
        let mut conn = self.acquire().await?;
        let result = conn.fetch_all(&statement).await;
        conn.release();

        result.map_err(|err| {
            tracing::error!(
                table = self.entity.table(),
                sql = statement.sql(),
                error = %err,
                "error querying table"
            );
            err.into()
        })
    }

    async fn write(&self, statement: Statement) -> Result<WriteOutcome, ServiceError> {
        let mut conn = self.acquire().await?;
        let result = conn.execute(&statement).await;
        conn.release();

        result.map_err(|err| {
            tracing::error!(
                table = self.entity.table(),
                sql = statement.sql(),
                error = %err,
                "error writing table"
            );
            err.into()
        })
    }

    async fn acquire(&self) -> Result<PooledConnection, ServiceError> {
        self.pool.acquire().await.map_err(|err| {
            tracing::error!(entity = %self.entity, error = %err, "error acquiring database connection");
            ServiceError::Acquisition(err)
        })
    }
}
