//! PostgreSQL connection wrapper.

use deadpool_postgres::Object;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::debug;

use crate::error::PgResult;

/// A pooled PostgreSQL connection.
///
/// Parameterized statements are prepared once per connection and cached by
/// the pool; scripts go through the simple query protocol.
pub struct PgConnection {
    client: Object,
}

impl PgConnection {
    /// Create a new connection wrapper.
    pub(crate) fn new(client: Object) -> Self {
        Self { client }
    }

    /// Execute a query and return all rows.
    pub async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> PgResult<Vec<Row>> {
        debug!(sql = %sql, "Executing query");

        let stmt = self.client.prepare_cached(sql).await?;
        let rows = self.client.query(&stmt, params).await?;
        Ok(rows)
    }

    /// Execute a statement and return the number of affected rows.
    pub async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> PgResult<u64> {
        debug!(sql = %sql, "Executing statement");

        let stmt = self.client.prepare_cached(sql).await?;
        let count = self.client.execute(&stmt, params).await?;
        Ok(count)
    }

    /// Execute one or more statements in a single round-trip.
    ///
    /// No parameters; multiple `;`-separated statements are allowed.
    pub async fn batch_execute(&self, sql: &str) -> PgResult<()> {
        debug!(bytes = sql.len(), "Executing batch");
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}
