//! Reconciliation actions and apply outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do with one migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Already applied with the same content; nothing to do.
    Skip,
    /// Applied before the manifest's first entry; dropped from comparison
    /// without running its undo script or touching its row.
    Shrink,
    /// Run the undo script and delete the tracking row.
    Remove,
    /// Run the undo script, then the new do script, and update the row in place.
    ///
    /// Never produced by [`reconcile`](crate::reconcile::reconcile); only
    /// reachable through caller-supplied action lists.
    Change,
    /// Run the do script and insert a tracking row.
    Add,
}

impl ActionKind {
    /// Lowercase name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Shrink => "shrink",
            Self::Remove => "remove",
            Self::Change => "change",
            Self::Add => "add",
        }
    }

    /// Check if this action touches the database.
    pub fn has_effect(&self) -> bool {
        matches!(self, Self::Remove | Self::Change | Self::Add)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action paired with the migration it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Migration name.
    pub name: String,
    /// What to do.
    pub action: ActionKind,
}

impl Action {
    /// Create a new action.
    pub fn new(name: impl Into<String>, action: ActionKind) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }

    /// Create a skip action.
    pub fn skip(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Skip)
    }

    /// Create a shrink action.
    pub fn shrink(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Shrink)
    }

    /// Create a remove action.
    pub fn remove(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Remove)
    }

    /// Create a change action.
    pub fn change(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Change)
    }

    /// Create an add action.
    pub fn add(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Add)
    }

    /// Build the outcome reported for this action.
    pub fn outcome(&self, success: bool) -> ActionOutcome {
        ActionOutcome {
            name: self.name.clone(),
            action: self.action,
            success,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.name)
    }
}

/// Result of attempting one action, as delivered to the notifier.
///
/// A `success: true` outcome is provisional until the whole run commits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Migration name.
    pub name: String,
    /// The attempted action.
    pub action: ActionKind,
    /// Whether the action's database effects succeeded.
    pub success: bool,
}
