//! Transactional execution of an action list.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::{debug, error, info, warn};

use crate::action::{Action, ActionKind, ActionOutcome};
use crate::error::{ApplyError, MigrateResult, MigrationError};
use crate::history::TrackingStore;
use crate::migration::{AppliedRecord, Migration};
use crate::reconcile::MigrationIndex;

/// Executes actions against a [`TrackingStore`] inside one transaction.
///
/// The applier works on the snapshot of both sequences that the actions
/// were computed from; undo scripts come from the applied records and do
/// scripts from the desired migrations.
#[derive(Debug)]
pub struct Applier<'a> {
    index: MigrationIndex<'a>,
    clock: ExecutionClock,
}

impl<'a> Applier<'a> {
    /// Create an applier over one snapshot.
    pub fn new(applied: &'a [AppliedRecord], desired: &'a [Migration]) -> Self {
        let latest = applied.iter().map(|r| r.executed_at).max();
        Self {
            index: MigrationIndex::new(applied, desired),
            clock: ExecutionClock::after(latest),
        }
    }

    /// Apply `actions` without observing individual outcomes.
    pub async fn apply_silent<S>(&mut self, store: &S, actions: &[Action]) -> MigrateResult<()>
    where
        S: TrackingStore + ?Sized,
    {
        self.apply(store, actions, |_| {}).await
    }

    /// Apply `actions` in order, all or nothing.
    ///
    /// `notify` receives one outcome per attempted action, before the next
    /// action starts. The first failing action is reported with
    /// `success: false`, the transaction is rolled back and the failure is
    /// returned as [`MigrationError::Apply`]. Actions after it are not
    /// attempted.
    pub async fn apply<S, N>(&mut self, store: &S, actions: &[Action], mut notify: N) -> MigrateResult<()>
    where
        S: TrackingStore + ?Sized,
        N: FnMut(&ActionOutcome),
    {
        store.begin().await?;
        debug!(actions = actions.len(), "Transaction started");

        for action in actions {
            debug!(name = %action.name, action = %action.action, "Applying action");

            match self.run_action(store, action).await {
                Ok(()) => notify(&action.outcome(true)),
                Err(source) => {
                    notify(&action.outcome(false));
                    warn!(
                        name = %action.name,
                        action = %action.action,
                        error = %source,
                        "Action failed, rolling back"
                    );

                    let mut failure = ApplyError::new(action.name.clone(), action.action, source);
                    if let Err(rollback_error) = store.rollback().await {
                        error!(error = %rollback_error, "Rollback failed");
                        failure.rollback_error = Some(rollback_error);
                    }
                    return Err(failure.into());
                }
            }
        }

        store.commit().await?;
        info!(actions = actions.len(), "Migration run committed");
        Ok(())
    }

    async fn run_action<S>(&mut self, store: &S, action: &Action) -> MigrateResult<()>
    where
        S: TrackingStore + ?Sized,
    {
        let name = action.name.as_str();

        match action.action {
            ActionKind::Skip | ActionKind::Shrink => Ok(()),
            ActionKind::Remove => {
                if let Some(current) = self.index.applied(name) {
                    run_script(store, name, current.undo_script()).await?;
                }
                store.delete_record(name).await
            }
            ActionKind::Add => {
                let migration = self.desired(name)?;
                run_script(store, name, migration.do_script()).await?;
                let record = AppliedRecord::new(migration.clone(), self.clock.next());
                store.insert_record(&record).await
            }
            ActionKind::Change => {
                let migration = self.desired(name)?;
                if let Some(current) = self.index.applied(name) {
                    run_script(store, name, current.undo_script()).await?;
                }
                run_script(store, name, migration.do_script()).await?;
                let record = AppliedRecord::new(migration.clone(), self.clock.next());
                store.update_record(&record).await
            }
        }
    }

    fn desired(&self, name: &str) -> MigrateResult<&'a Migration> {
        self.index
            .desired(name)
            .ok_or_else(|| MigrationError::NotFound(name.to_string()))
    }
}

async fn run_script<S>(store: &S, name: &str, sql: &str) -> MigrateResult<()>
where
    S: TrackingStore + ?Sized,
{
    store
        .execute_script(sql)
        .await
        .map_err(|e| MigrationError::script(name, e.to_string()))
}

/// Hands out strictly increasing execution timestamps.
///
/// Timestamps are truncated to microseconds, the precision of a PostgreSQL
/// `timestamptz`, so ordering by the stored value reproduces the order in
/// which rows were written.
#[derive(Debug)]
struct ExecutionClock {
    last: Option<DateTime<Utc>>,
}

impl ExecutionClock {
    fn after(last: Option<DateTime<Utc>>) -> Self {
        Self { last }
    }

    fn next(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now().trunc_subsecs(6);
        if let Some(last) = self.last {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last = Some(now);
        now
    }
}
