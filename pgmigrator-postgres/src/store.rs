//! Tracking store backed by a PostgreSQL table.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pgmigrator_core::{AppliedRecord, MigrateResult, MigrationError, TrackingStore, TrackingTable};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::PgConfig;
use crate::connection::PgConnection;
use crate::error::{PgError, PgResult};
use crate::pool::PgPool;
use crate::row::FromPgRow;

/// A [`TrackingStore`] writing to `"schema"."table"` in PostgreSQL.
///
/// The first call checks out one connection from the pool and every later
/// call reuses it, so `BEGIN`, the scripts, the row writes and
/// `COMMIT`/`ROLLBACK` all run in the same session.
pub struct PgTrackingStore {
    pool: PgPool,
    table: TrackingTable,
    conn: OnceCell<PgConnection>,
    in_transaction: AtomicBool,
}

impl PgTrackingStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool, table: TrackingTable) -> Self {
        Self {
            pool,
            table,
            conn: OnceCell::new(),
            in_transaction: AtomicBool::new(false),
        }
    }

    /// Create a store with its own pool.
    pub fn connect(config: PgConfig, table: TrackingTable) -> PgResult<Self> {
        Ok(Self::new(PgPool::new(config)?, table))
    }

    /// Get the tracking table location.
    pub fn table(&self) -> &TrackingTable {
        &self.table
    }

    /// Get the pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn connection(&self) -> PgResult<&PgConnection> {
        self.conn.get_or_try_init(|| self.pool.get()).await
    }

    async fn end_transaction(&self, statement: &str) -> PgResult<()> {
        if !self.in_transaction.load(Ordering::Acquire) {
            return Err(PgError::transaction(format!(
                "{} without an open transaction",
                statement
            )));
        }
        let result = self.connection().await?.batch_execute(statement).await;
        self.in_transaction.store(false, Ordering::Release);
        result
    }
}

#[async_trait]
impl TrackingStore for PgTrackingStore {
    async fn initialize(&self) -> MigrateResult<()> {
        self.connection()
            .await?
            .batch_execute(&self.table.create_sql())
            .await?;
        info!(table = %self.table.qualified_name(), "Tracking table ready");
        Ok(())
    }

    async fn load_applied(&self) -> MigrateResult<Vec<AppliedRecord>> {
        let rows = self
            .connection()
            .await?
            .query(&self.table.select_sql(), &[])
            .await?;

        let records = rows
            .iter()
            .map(AppliedRecord::from_row)
            .collect::<PgResult<Vec<_>>>()?;
        debug!(count = records.len(), "Loaded applied migrations");
        Ok(records)
    }

    async fn begin(&self) -> MigrateResult<()> {
        if self.in_transaction.swap(true, Ordering::AcqRel) {
            return Err(MigrationError::transaction("transaction already open"));
        }

        let result = async { self.connection().await?.batch_execute("BEGIN").await }.await;
        if result.is_err() {
            self.in_transaction.store(false, Ordering::Release);
        }
        Ok(result?)
    }

    async fn commit(&self) -> MigrateResult<()> {
        Ok(self.end_transaction("COMMIT").await?)
    }

    async fn rollback(&self) -> MigrateResult<()> {
        Ok(self.end_transaction("ROLLBACK").await?)
    }

    async fn execute_script(&self, sql: &str) -> MigrateResult<()> {
        Ok(self.connection().await?.batch_execute(sql).await?)
    }

    async fn insert_record(&self, record: &AppliedRecord) -> MigrateResult<()> {
        let m = &record.migration;
        self.connection()
            .await?
            .execute(
                &self.table.insert_sql(),
                &[
                    &m.name(),
                    &m.do_script(),
                    &m.do_hash(),
                    &m.undo_script(),
                    &m.undo_hash(),
                    &record.executed_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn update_record(&self, record: &AppliedRecord) -> MigrateResult<()> {
        let m = &record.migration;
        let updated = self
            .connection()
            .await?
            .execute(
                &self.table.update_sql(),
                &[
                    &m.name(),
                    &m.do_script(),
                    &m.do_hash(),
                    &m.undo_script(),
                    &m.undo_hash(),
                    &record.executed_at,
                ],
            )
            .await?;

        if updated == 0 {
            return Err(MigrationError::NotFound(m.name().to_string()));
        }
        Ok(())
    }

    async fn delete_record(&self, name: &str) -> MigrateResult<()> {
        self.connection()
            .await?
            .execute(&self.table.delete_sql(), &[&name])
            .await?;
        Ok(())
    }
}
