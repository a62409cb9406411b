//! Reconciliation of the applied sequence against the desired sequence.
//!
//! The algorithm is a longest-common-prefix walk:
//!
//! ```text
//! applied:  1  2  3  4  5
//! desired:        3  4  5'
//!           ─────  ────  ──
//!           shrink skip  remove 5, add 5'
//! ```
//!
//! Everything after the first divergence is removed in reverse application
//! order and re-added in manifest order. No attempt is made to match
//! reordered or renamed migrations past that point.

use std::collections::HashMap;

use crate::action::Action;
use crate::migration::{AppliedRecord, Migration};

/// Compute the ordered list of actions that turns `applied` into `desired`.
///
/// The result is `shrinks ++ skips ++ removes (reversed) ++ adds`. When
/// `desired` is empty every applied migration is removed in its original
/// order. Never fails.
pub fn reconcile(applied: &[AppliedRecord], desired: &[Migration]) -> Vec<Action> {
    let Some(first) = desired.first() else {
        return applied.iter().map(|r| Action::remove(r.name())).collect();
    };

    let mut actions = Vec::with_capacity(applied.len() + desired.len());

    // Applied migrations preceding the manifest's first entry belong to the
    // baseline and are dropped from comparison.
    let shrink = applied
        .iter()
        .position(|r| r.name() == first.name())
        .unwrap_or(0);
    actions.extend(applied[..shrink].iter().map(|r| Action::shrink(r.name())));
    let applied = &applied[shrink..];

    let common = applied
        .iter()
        .zip(desired)
        .take_while(|(record, migration)| record.migration.same_content(migration))
        .count();

    actions.extend(applied[..common].iter().map(|r| Action::skip(r.name())));
    actions.extend(applied[common..].iter().rev().map(|r| Action::remove(r.name())));
    actions.extend(desired[common..].iter().map(|m| Action::add(m.name())));

    actions
}

/// Check whether an action list would change anything.
pub fn has_changes(actions: &[Action]) -> bool {
    actions.iter().any(|a| a.action.has_effect())
}

/// Name lookups over one snapshot of both sequences.
///
/// Built once per run and never mutated.
#[derive(Debug)]
pub struct MigrationIndex<'a> {
    applied: HashMap<&'a str, &'a AppliedRecord>,
    desired: HashMap<&'a str, &'a Migration>,
}

impl<'a> MigrationIndex<'a> {
    /// Index both sequences by name.
    pub fn new(applied: &'a [AppliedRecord], desired: &'a [Migration]) -> Self {
        Self {
            applied: applied.iter().map(|r| (r.name(), r)).collect(),
            desired: desired.iter().map(|m| (m.name(), m)).collect(),
        }
    }

    /// Look up an applied record.
    pub fn applied(&self, name: &str) -> Option<&'a AppliedRecord> {
        self.applied.get(name).copied()
    }

    /// Look up a desired migration.
    pub fn desired(&self, name: &str) -> Option<&'a Migration> {
        self.desired.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    /// Build an applied sequence where each script is the migration name.
    fn applied(names: &[&str]) -> Vec<AppliedRecord> {
        names
            .iter()
            .map(|n| AppliedRecord::new(Migration::new(*n, *n, *n), Utc::now()))
            .collect()
    }

    /// Build a desired sequence from `(name, do_script)` pairs.
    fn desired(entries: &[(&str, &str)]) -> Vec<Migration> {
        entries
            .iter()
            .map(|(n, script)| Migration::new(*n, *script, *n))
            .collect()
    }

    #[test]
    fn test_no_changes() {
        let actions = reconcile(
            &applied(&["1", "2", "3"]),
            &desired(&[("1", "1"), ("2", "2"), ("3", "3")]),
        );

        assert_eq!(
            actions,
            vec![Action::skip("1"), Action::skip("2"), Action::skip("3")]
        );
        assert!(!has_changes(&actions));
    }

    #[test]
    fn test_shrink() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("3", "3"), ("4", "4"), ("5", "5")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::shrink("2"),
                Action::skip("3"),
                Action::skip("4"),
                Action::skip("5"),
            ]
        );
        assert!(!has_changes(&actions));
    }

    #[test]
    fn test_add() {
        let actions = reconcile(
            &applied(&["1", "2", "3"]),
            &desired(&[("3", "3"), ("4", "4"), ("5", "5")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::shrink("2"),
                Action::skip("3"),
                Action::add("4"),
                Action::add("5"),
            ]
        );
    }

    #[test]
    fn test_change_last() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("3", "3"), ("4", "4"), ("5", "5.1")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::shrink("2"),
                Action::skip("3"),
                Action::skip("4"),
                Action::remove("5"),
                Action::add("5"),
            ]
        );
    }

    #[test]
    fn test_change_center() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("1", "1"), ("2", "2"), ("3", "3.1"), ("4", "4"), ("5", "5")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::skip("1"),
                Action::skip("2"),
                Action::remove("5"),
                Action::remove("4"),
                Action::remove("3"),
                Action::add("3"),
                Action::add("4"),
                Action::add("5"),
            ]
        );
    }

    #[test]
    fn test_add_center() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("2", "2"), ("3", "3"), ("6", "6"), ("4", "4"), ("5", "5")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::skip("2"),
                Action::skip("3"),
                Action::remove("5"),
                Action::remove("4"),
                Action::add("6"),
                Action::add("4"),
                Action::add("5"),
            ]
        );
    }

    #[test]
    fn test_remove_center() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("2", "2"), ("4", "4"), ("5", "5")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::skip("2"),
                Action::remove("5"),
                Action::remove("4"),
                Action::remove("3"),
                Action::add("4"),
                Action::add("5"),
            ]
        );
    }

    #[test]
    fn test_swap_end() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("2", "2"), ("3", "3"), ("5", "5"), ("4", "4")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::skip("2"),
                Action::skip("3"),
                Action::remove("5"),
                Action::remove("4"),
                Action::add("5"),
                Action::add("4"),
            ]
        );
    }

    #[test]
    fn test_swap_center() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("2", "2"), ("4", "4"), ("3", "3"), ("5", "5")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::skip("2"),
                Action::remove("5"),
                Action::remove("4"),
                Action::remove("3"),
                Action::add("4"),
                Action::add("3"),
                Action::add("5"),
            ]
        );
    }

    #[test]
    fn test_mixed() {
        let actions = reconcile(
            &applied(&["1", "2", "3", "4", "5"]),
            &desired(&[("2", "2"), ("4", "4.1"), ("5", "5"), ("6", "6")]),
        );

        assert_eq!(
            actions,
            vec![
                Action::shrink("1"),
                Action::skip("2"),
                Action::remove("5"),
                Action::remove("4"),
                Action::remove("3"),
                Action::add("4"),
                Action::add("5"),
                Action::add("6"),
            ]
        );
    }

    #[test]
    fn test_empty_desired_removes_in_applied_order() {
        let actions = reconcile(&applied(&["1", "2", "3"]), &[]);

        assert_eq!(
            actions,
            vec![Action::remove("1"), Action::remove("2"), Action::remove("3")]
        );
    }

    #[test]
    fn test_both_empty() {
        assert!(reconcile(&[], &[]).is_empty());
    }

    #[test]
    fn test_empty_applied_adds_everything() {
        let actions = reconcile(&[], &desired(&[("1", "1"), ("2", "2")]));

        assert_eq!(actions, vec![Action::add("1"), Action::add("2")]);
    }

    #[test]
    fn test_first_desired_not_applied_means_no_shrink() {
        let actions = reconcile(&applied(&["1", "2"]), &desired(&[("0", "0"), ("1", "1")]));

        assert_eq!(
            actions,
            vec![
                Action::remove("2"),
                Action::remove("1"),
                Action::add("0"),
                Action::add("1"),
            ]
        );
    }

    #[test]
    fn test_undo_only_change_is_ignored() {
        let applied = applied(&["1", "2"]);
        let desired = vec![Migration::new("1", "1", "1"), Migration::new("2", "2", "changed")];

        assert_eq!(
            reconcile(&applied, &desired),
            vec![Action::skip("1"), Action::skip("2")]
        );
    }

    #[test]
    fn test_stored_hash_is_compared_not_script() {
        // A record rehydrated with a hash that no longer matches its script
        // is compared by the stored hash.
        let applied = vec![AppliedRecord::new(
            Migration::with_hashes("1", "1", "1", "stale", "stale"),
            Utc::now(),
        )];

        assert_eq!(
            reconcile(&applied, &desired(&[("1", "1")])),
            vec![Action::remove("1"), Action::add("1")]
        );
    }

    #[test]
    fn test_index_lookup() {
        let applied = applied(&["1", "2"]);
        let desired = desired(&[("2", "2"), ("3", "3")]);
        let index = MigrationIndex::new(&applied, &desired);

        assert_eq!(index.applied("1").map(|r| r.name()), Some("1"));
        assert!(index.applied("3").is_none());
        assert_eq!(index.desired("3").map(|m| m.name()), Some("3"));
        assert!(index.desired("1").is_none());
    }
}
