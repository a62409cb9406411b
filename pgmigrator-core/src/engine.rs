//! Migration engine implementation.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::action::{Action, ActionKind, ActionOutcome};
use crate::apply::Applier;
use crate::catalog::{CatalogConfig, CatalogLoader};
use crate::error::MigrateResult;
use crate::history::TrackingStore;
use crate::migration::{AppliedRecord, Migration};
use crate::reconcile::reconcile;

/// Configuration for the migrator.
#[derive(Debug, Clone, Default)]
pub struct MigratorConfig {
    /// Where to read the desired migrations from.
    pub catalog: CatalogConfig,
}

impl MigratorConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog configuration.
    pub fn catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        self
    }
}

/// Both sequences, loaded to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    /// Applied migrations, in execution order.
    pub applied: Vec<AppliedRecord>,
    /// Desired migrations, in manifest order.
    pub desired: Vec<Migration>,
}

impl MigrationState {
    /// Compute the actions for this snapshot.
    pub fn actions(&self) -> Vec<Action> {
        reconcile(&self.applied, &self.desired)
    }
}

/// Result of a committed migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Migrations left untouched.
    pub skipped: usize,
    /// Applied migrations dropped from comparison.
    pub shrunk: usize,
    /// Migrations reverted.
    pub removed: usize,
    /// Migrations reverted and re-applied in place.
    pub changed: usize,
    /// Migrations applied.
    pub added: usize,
    /// Total duration in milliseconds.
    pub duration_ms: i64,
    /// Every action of the run, in execution order.
    pub actions: Vec<Action>,
}

impl MigrationReport {
    fn new(actions: Vec<Action>, duration_ms: i64) -> Self {
        let mut report = Self {
            duration_ms,
            ..Default::default()
        };
        for action in &actions {
            match action.action {
                ActionKind::Skip => report.skipped += 1,
                ActionKind::Shrink => report.shrunk += 1,
                ActionKind::Remove => report.removed += 1,
                ActionKind::Change => report.changed += 1,
                ActionKind::Add => report.added += 1,
            }
        }
        report.actions = actions;
        report
    }

    /// Check if the run modified the database.
    pub fn has_changes(&self) -> bool {
        self.removed + self.changed + self.added > 0
    }

    /// Get a summary of the report.
    pub fn summary(&self) -> String {
        let parts: Vec<_> = [
            (self.added, "added"),
            (self.changed, "changed"),
            (self.removed, "removed"),
            (self.skipped, "unchanged"),
            (self.shrunk, "shrunk"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        if !self.has_changes() {
            if parts.is_empty() {
                "No migrations".to_string()
            } else {
                format!("No changes ({})", parts.join(", "))
            }
        } else {
            format!("{} in {}ms", parts.join(", "), self.duration_ms)
        }
    }
}

/// The main migrator.
///
/// Reads the desired sequence through a [`CatalogLoader`], the applied
/// sequence through a [`TrackingStore`], and brings the store in line with
/// the catalog.
#[derive(Debug)]
pub struct Migrator<S: TrackingStore> {
    loader: CatalogLoader,
    store: S,
}

impl<S: TrackingStore> Migrator<S> {
    /// Create a new migrator.
    pub fn new(config: MigratorConfig, store: S) -> Self {
        Self {
            loader: CatalogLoader::new(config.catalog),
            store,
        }
    }

    /// Get the tracking store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the catalog loader.
    pub fn loader(&self) -> &CatalogLoader {
        &self.loader
    }

    /// Create the tracking table if needed.
    pub async fn initialize(&self) -> MigrateResult<()> {
        self.store.initialize().await
    }

    /// Load the applied and desired sequences.
    pub async fn load(&self) -> MigrateResult<MigrationState> {
        let desired = self.loader.load().await?;
        let applied = self.store.load_applied().await?;

        Ok(MigrationState { applied, desired })
    }

    /// List the actions a migration run would perform.
    pub async fn inspect(&self) -> MigrateResult<Vec<Action>> {
        Ok(self.load().await?.actions())
    }

    /// Bring the database in line with the catalog.
    pub async fn migrate<N>(&self, notify: N) -> MigrateResult<MigrationReport>
    where
        N: FnMut(&ActionOutcome),
    {
        let state = self.load().await?;
        let actions = state.actions();
        self.run(&state, actions, notify).await
    }

    /// Apply a caller-supplied action list against a freshly loaded snapshot.
    pub async fn migrate_actions<N>(
        &self,
        actions: Vec<Action>,
        notify: N,
    ) -> MigrateResult<MigrationReport>
    where
        N: FnMut(&ActionOutcome),
    {
        let state = self.load().await?;
        self.run(&state, actions, notify).await
    }

    async fn run<N>(
        &self,
        state: &MigrationState,
        actions: Vec<Action>,
        notify: N,
    ) -> MigrateResult<MigrationReport>
    where
        N: FnMut(&ActionOutcome),
    {
        let start = Instant::now();

        Applier::new(&state.applied, &state.desired)
            .apply(&self.store, &actions, notify)
            .await?;

        let report = MigrationReport::new(actions, start.elapsed().as_millis() as i64);
        info!(summary = %report.summary(), "Migration complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_catalog(dir: &Path, names: &[&str]) {
        std::fs::write(dir.join("order"), names.join("\n")).unwrap();
        for name in names {
            std::fs::write(
                dir.join(format!("{}.do.sql", name)),
                format!("CREATE TABLE {} ();", name),
            )
            .unwrap();
            std::fs::write(
                dir.join(format!("{}.undo.sql", name)),
                format!("DROP TABLE {};", name),
            )
            .unwrap();
        }
    }

    fn migrator(dir: &TempDir, store: MemoryStore) -> Migrator<MemoryStore> {
        let config = MigratorConfig::new().catalog(CatalogConfig::new(dir.path()));
        Migrator::new(config, store)
    }

    #[test]
    fn test_migrator_debug() {
        let dir = TempDir::new().unwrap();
        let migrator = migrator(&dir, MemoryStore::new());

        let rendered = format!("{:?}", migrator);
        assert!(rendered.starts_with("Migrator"));
        assert!(rendered.contains("CatalogLoader"));
    }

    #[tokio::test]
    async fn test_initialize() {
        let dir = TempDir::new().unwrap();
        let migrator = migrator(&dir, MemoryStore::new());

        migrator.initialize().await.unwrap();
        assert!(migrator.store().is_initialized());
    }

    #[tokio::test]
    async fn test_inspect_does_not_touch_store() {
        let dir = TempDir::new().unwrap();
        write_catalog(dir.path(), &["a", "b"]);
        let migrator = migrator(&dir, MemoryStore::new());

        let actions = migrator.inspect().await.unwrap();

        assert_eq!(actions, vec![Action::add("a"), Action::add("b")]);
        assert!(migrator.store().executed_scripts().is_empty());
        assert_eq!(migrator.store().commit_count(), 0);
    }

    #[tokio::test]
    async fn test_migrate_then_nothing_to_do() {
        let dir = TempDir::new().unwrap();
        write_catalog(dir.path(), &["a", "b"]);
        let migrator = migrator(&dir, MemoryStore::new());

        let report = migrator.migrate(|_| {}).await.unwrap();
        assert_eq!(report.added, 2);
        assert!(report.has_changes());

        let second = migrator.migrate(|_| {}).await.unwrap();
        assert_eq!(second.skipped, 2);
        assert!(!second.has_changes());
        assert_eq!(second.summary(), "No changes (2 unchanged)");
    }

    #[tokio::test]
    async fn test_migrate_notifies_in_order() {
        let dir = TempDir::new().unwrap();
        write_catalog(dir.path(), &["b", "c"]);
        let applied = vec![AppliedRecord::new(
            Migration::new("a", "CREATE TABLE a ();", "DROP TABLE a;"),
            Utc::now(),
        )];
        let migrator = migrator(&dir, MemoryStore::with_records(applied));

        let mut seen = Vec::new();
        migrator
            .migrate(|o| seen.push(format!("{} {}", o.action, o.name)))
            .await
            .unwrap();

        assert_eq!(seen, vec!["remove a", "add b", "add c"]);
    }

    #[tokio::test]
    async fn test_migrate_actions_runs_change() {
        let dir = TempDir::new().unwrap();
        write_catalog(dir.path(), &["a"]);
        let applied = vec![AppliedRecord::new(
            Migration::new("a", "CREATE TABLE a (id int);", "DROP TABLE a;"),
            Utc::now(),
        )];
        let migrator = migrator(&dir, MemoryStore::with_records(applied));

        let report = migrator
            .migrate_actions(vec![Action::change("a")], |_| {})
            .await
            .unwrap();

        assert_eq!(report.changed, 1);
        assert_eq!(
            migrator.store().executed_scripts(),
            vec!["DROP TABLE a;", "CREATE TABLE a ();"]
        );
        let state = migrator.load().await.unwrap();
        assert_eq!(state.applied[0].do_hash(), state.desired[0].do_hash());
    }

    #[tokio::test]
    async fn test_load_error_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let migrator = migrator(&dir, MemoryStore::new());

        let err = migrator.migrate(|_| {}).await.unwrap_err();
        assert!(err.is_load_error());
        assert_eq!(migrator.store().commit_count(), 0);
        assert_eq!(migrator.store().rollback_count(), 0);
    }

    #[test]
    fn test_report_summary() {
        let report = MigrationReport::new(
            vec![Action::shrink("0"), Action::skip("1"), Action::remove("2"), Action::add("2")],
            12,
        );

        assert_eq!(report.summary(), "1 added, 1 removed, 1 unchanged, 1 shrunk in 12ms");
        assert_eq!(MigrationReport::default().summary(), "No migrations");
    }
}
