//! Fuzz target for prefix reconciliation.
//!
//! Builds arbitrary applied/desired histories over a small name space so
//! that shared prefixes, reorderings and edits are all common, then checks
//! the shape of the resulting action list.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_reconcile
//! ```

#![no_main]

use arbitrary::Arbitrary;
use chrono::{Duration, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use pgmigrator_core::{ActionKind, AppliedRecord, Migration, reconcile};
use std::collections::HashSet;

/// A migration drawn from a handful of names and script variants.
#[derive(Debug, Arbitrary)]
struct FuzzMigration {
    name: u8,
    variant: u8,
}

impl FuzzMigration {
    fn build(&self) -> Migration {
        let name = format!("m{}", self.name % 8);
        Migration::new(
            name.clone(),
            format!("CREATE TABLE {} (v{} int);", name, self.variant % 3),
            format!("DROP TABLE {};", name),
        )
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    applied: Vec<FuzzMigration>,
    desired: Vec<FuzzMigration>,
}

fn dedup(migrations: &[FuzzMigration]) -> Vec<Migration> {
    let mut seen = HashSet::new();
    migrations
        .iter()
        .map(FuzzMigration::build)
        .filter(|m| seen.insert(m.name().to_string()))
        .collect()
}

fuzz_target!(|input: FuzzInput| {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let applied: Vec<AppliedRecord> = dedup(&input.applied)
        .into_iter()
        .enumerate()
        .map(|(i, m)| AppliedRecord::new(m, base + Duration::seconds(i as i64)))
        .collect();
    let desired = dedup(&input.desired);

    let actions = reconcile(&applied, &desired);

    // Never produced by reconciliation
    assert!(actions.iter().all(|a| a.action != ActionKind::Change));

    if desired.is_empty() {
        assert_eq!(actions.len(), applied.len());
        for (action, record) in actions.iter().zip(&applied) {
            assert_eq!(action.action, ActionKind::Remove);
            assert_eq!(action.name, record.name());
        }
        return;
    }

    // Phases appear in order: shrink, skip, remove, add
    let rank = |kind: ActionKind| match kind {
        ActionKind::Shrink => 0,
        ActionKind::Skip => 1,
        ActionKind::Remove => 2,
        ActionKind::Add => 3,
        ActionKind::Change => 4,
    };
    assert!(actions.windows(2).all(|w| rank(w[0].action) <= rank(w[1].action)));

    // Every applied entry is accounted for exactly once
    let touched = actions
        .iter()
        .filter(|a| a.action != ActionKind::Add)
        .count();
    assert_eq!(touched, applied.len());

    // After applying, the retained history ends with the desired sequence
    let adds: Vec<&str> = actions
        .iter()
        .filter(|a| a.action == ActionKind::Add)
        .map(|a| a.name.as_str())
        .collect();
    let skips: Vec<&str> = actions
        .iter()
        .filter(|a| a.action == ActionKind::Skip)
        .map(|a| a.name.as_str())
        .collect();
    let result: Vec<&str> = skips.into_iter().chain(adds).collect();
    let expected: Vec<&str> = desired.iter().map(Migration::name).collect();
    assert_eq!(result, expected);
});
