//! PostgreSQL row types and deserialization.

use chrono::{DateTime, Utc};
use pgmigrator_core::{AppliedRecord, Migration};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

use crate::error::{PgError, PgResult};

/// Extension trait for PostgreSQL rows.
pub trait PgRow {
    /// Get a column value by name.
    fn get_value<T>(&self, column: &str) -> PgResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Get a nullable column value by name.
    fn get_opt<T>(&self, column: &str) -> PgResult<Option<T>>
    where
        T: for<'a> FromSql<'a>;
}

impl PgRow for Row {
    fn get_value<T>(&self, column: &str) -> PgResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column).map_err(|e| {
            PgError::deserialization(format!("failed to get column '{}': {}", column, e))
        })
    }

    fn get_opt<T>(&self, column: &str) -> PgResult<Option<T>>
    where
        T: for<'a> FromSql<'a>,
    {
        self.get_value::<Option<T>>(column)
    }
}

/// Trait for deserializing a PostgreSQL row into a type.
pub trait FromPgRow: Sized {
    /// Deserialize from a PostgreSQL row.
    fn from_row(row: &Row) -> PgResult<Self>;
}

/// Tracking rows keep their stored hashes; a NULL `undo_sql` reads as
/// an empty script.
impl FromPgRow for AppliedRecord {
    fn from_row(row: &Row) -> PgResult<Self> {
        let migration = Migration::with_hashes(
            row.get_value::<String>("name")?,
            row.get_value::<String>("do_sql")?,
            row.get_opt::<String>("undo_sql")?.unwrap_or_default(),
            row.get_value::<String>("do_hash")?,
            row.get_value::<String>("undo_hash")?,
        );
        let executed_at: DateTime<Utc> = row.get_value("exec_date")?;

        Ok(AppliedRecord::new(migration, executed_at))
    }
}
