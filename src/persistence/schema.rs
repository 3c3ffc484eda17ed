//! Optional table bootstrap at startup.

use super::pool::ConnectionPool;
use super::sql::Dialect;
use super::statement::Statement;
use crate::domain::Entity;
use crate::error::ServiceError;

/// `CREATE TABLE IF NOT EXISTS` for the entity's table.
#[must_use]
pub fn create_table_sql(dialect: Dialect, entity: Entity) -> String {
    let table = entity.table();
    match dialect {
        Dialect::MySql => format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
             id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY, \
             f_name VARCHAR(255) NULL, \
             l_name VARCHAR(255) NULL, \
             email VARCHAR(255) NULL, \
             phone VARCHAR(64) NULL)"
        ),
        Dialect::Sqlite => format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             f_name TEXT, \
             l_name TEXT, \
             email TEXT, \
             phone TEXT)"
        ),
    }
}

/// Ensures the entity's table exists, using one pooled connection.
///
/// # Errors
///
/// Returns [`ServiceError::Acquisition`] if no connection can be acquired
/// and [`ServiceError::Statement`] if the DDL fails.
pub async fn bootstrap(
    pool: &ConnectionPool,
    dialect: Dialect,
    entity: Entity,
) -> Result<(), ServiceError> {
    let statement = Statement::new(create_table_sql(dialect, entity), Vec::new());
    let mut conn = pool.acquire().await?;
    let result = conn.execute(&statement).await;
    conn.release();
    result?;

    tracing::info!(table = entity.table(), ?dialect, "table schema ensured");
    Ok(())
}
