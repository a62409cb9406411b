//! Applied-state tracking.

use crate::error::MigrateResult;
use crate::migration::AppliedRecord;

/// Persistent store for applied migrations.
///
/// The store owns the tracking rows and the transaction the applier runs
/// in. Every method between [`begin`](Self::begin) and
/// [`commit`](Self::commit)/[`rollback`](Self::rollback) belongs to that
/// single transaction.
#[async_trait::async_trait]
pub trait TrackingStore: Send + Sync {
    /// Create the tracking table if it does not exist.
    async fn initialize(&self) -> MigrateResult<()>;

    /// Get all applied migrations, ordered by execution time ascending.
    async fn load_applied(&self) -> MigrateResult<Vec<AppliedRecord>>;

    /// Start the run's transaction.
    async fn begin(&self) -> MigrateResult<()>;

    /// Commit the run's transaction.
    async fn commit(&self) -> MigrateResult<()>;

    /// Roll back the run's transaction.
    async fn rollback(&self) -> MigrateResult<()>;

    /// Execute a do or undo script.
    async fn execute_script(&self, sql: &str) -> MigrateResult<()>;

    /// Insert a tracking row.
    async fn insert_record(&self, record: &AppliedRecord) -> MigrateResult<()>;

    /// Replace scripts, hashes and execution time of an existing row.
    async fn update_record(&self, record: &AppliedRecord) -> MigrateResult<()>;

    /// Delete a tracking row.
    async fn delete_record(&self, name: &str) -> MigrateResult<()>;
}

/// Location of the tracking table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingTable {
    /// Database schema holding the table.
    pub schema: String,
    /// Table name.
    pub table: String,
}

impl Default for TrackingTable {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            table: "schema_versions".to_string(),
        }
    }
}

impl TrackingTable {
    /// Create a table location.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Set the schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Fully qualified, quoted table name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }

    /// DDL creating the tracking table.
    pub fn create_sql(&self) -> String {
        format!(
            r#"
CREATE TABLE IF NOT EXISTS {} (
    name varchar(255) NOT NULL UNIQUE,
    do_hash varchar(64) NOT NULL,
    do_sql text NOT NULL,
    undo_hash varchar(64) NOT NULL,
    undo_sql text,
    exec_date timestamp with time zone NOT NULL DEFAULT now()
)
"#,
            self.qualified_name()
        )
    }

    /// Query selecting applied rows in execution order.
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT name, do_hash, do_sql, undo_hash, undo_sql, exec_date FROM {} ORDER BY exec_date",
            self.qualified_name()
        )
    }

    /// Statement inserting one row.
    pub fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (name, do_sql, do_hash, undo_sql, undo_hash, exec_date) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            self.qualified_name()
        )
    }

    /// Statement updating one row in place.
    pub fn update_sql(&self) -> String {
        format!(
            "UPDATE {} SET do_sql = $2, do_hash = $3, undo_sql = $4, undo_hash = $5, exec_date = $6 \
             WHERE name = $1",
            self.qualified_name()
        )
    }

    /// Statement deleting one row.
    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE name = $1", self.qualified_name())
    }
}

/// Quote a PostgreSQL identifier.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
