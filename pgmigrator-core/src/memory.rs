//! In-memory tracking store.
//!
//! Rows live in a mutex-guarded vector. `begin` snapshots the rows and
//! `rollback` restores the snapshot, which gives the same all-or-nothing
//! behavior as a database transaction. Scripts are not interpreted; they
//! are appended to an execution log, and scripts matching a configured
//! pattern fail. Useful for rehearsing a run and for tests.

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};
use crate::history::TrackingStore;
use crate::migration::AppliedRecord;

#[derive(Debug, Default)]
struct MemoryState {
    initialized: bool,
    rows: Vec<AppliedRecord>,
    snapshot: Option<Vec<AppliedRecord>>,
    executed: Vec<String>,
    failing: Vec<String>,
    fail_rollback: bool,
    commits: usize,
    rollbacks: usize,
}

/// A [`TrackingStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds the given rows.
    pub fn with_records(records: impl IntoIterator<Item = AppliedRecord>) -> Self {
        let store = Self::new();
        store.state.lock().rows = records.into_iter().collect();
        store
    }

    /// Make every script containing `pattern` fail.
    pub fn fail_on(self, pattern: impl Into<String>) -> Self {
        self.state.lock().failing.push(pattern.into());
        self
    }

    /// Make `rollback` fail, leaving the rows as they are.
    pub fn fail_rollback(self) -> Self {
        self.state.lock().fail_rollback = true;
        self
    }

    /// Current rows, in insertion order.
    pub fn records(&self) -> Vec<AppliedRecord> {
        self.state.lock().rows.clone()
    }

    /// Every script executed so far, including ones later rolled back.
    pub fn executed_scripts(&self) -> Vec<String> {
        self.state.lock().executed.clone()
    }

    /// Whether `initialize` has been called.
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.state.lock().snapshot.is_some()
    }

    /// Number of committed transactions.
    pub fn commit_count(&self) -> usize {
        self.state.lock().commits
    }

    /// Number of rolled back transactions.
    pub fn rollback_count(&self) -> usize {
        self.state.lock().rollbacks
    }
}

#[async_trait::async_trait]
impl TrackingStore for MemoryStore {
    async fn initialize(&self) -> MigrateResult<()> {
        self.state.lock().initialized = true;
        Ok(())
    }

    async fn load_applied(&self) -> MigrateResult<Vec<AppliedRecord>> {
        let mut rows = self.state.lock().rows.clone();
        rows.sort_by_key(|r| r.executed_at);
        Ok(rows)
    }

    async fn begin(&self) -> MigrateResult<()> {
        let mut state = self.state.lock();
        if state.snapshot.is_some() {
            return Err(MigrationError::transaction("transaction already open"));
        }
        state.snapshot = Some(state.rows.clone());
        Ok(())
    }

    async fn commit(&self) -> MigrateResult<()> {
        let mut state = self.state.lock();
        if state.snapshot.take().is_none() {
            return Err(MigrationError::transaction("no transaction to commit"));
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(&self) -> MigrateResult<()> {
        let mut state = self.state.lock();
        let Some(snapshot) = state.snapshot.take() else {
            return Err(MigrationError::transaction("no transaction to roll back"));
        };
        if state.fail_rollback {
            return Err(MigrationError::transaction("rollback rejected"));
        }
        state.rows = snapshot;
        state.rollbacks += 1;
        debug!(rows = state.rows.len(), "Restored in-memory snapshot");
        Ok(())
    }

    async fn execute_script(&self, sql: &str) -> MigrateResult<()> {
        let mut state = self.state.lock();
        state.executed.push(sql.to_string());

        if let Some(pattern) = state.failing.iter().find(|p| sql.contains(p.as_str())) {
            return Err(MigrationError::database(format!(
                "script rejected (matches '{}')",
                pattern
            )));
        }
        Ok(())
    }

    async fn insert_record(&self, record: &AppliedRecord) -> MigrateResult<()> {
        let mut state = self.state.lock();
        if state.rows.iter().any(|r| r.name() == record.name()) {
            return Err(MigrationError::database(format!(
                "duplicate key value violates unique constraint on name '{}'",
                record.name()
            )));
        }
        state.rows.push(record.clone());
        Ok(())
    }

    async fn update_record(&self, record: &AppliedRecord) -> MigrateResult<()> {
        let mut state = self.state.lock();
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.name() == record.name())
            .ok_or_else(|| MigrationError::NotFound(record.name().to_string()))?;
        *row = record.clone();
        Ok(())
    }

    async fn delete_record(&self, name: &str) -> MigrateResult<()> {
        self.state.lock().rows.retain(|r| r.name() != name);
        Ok(())
    }
}
