//! Error types for the migration engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::action::ActionKind;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during migration operations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The migration catalog could not be loaded.
    #[error("Catalog error: {message} ({})", path.display())]
    Catalog {
        /// File or directory that failed to load.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The manifest lists the same migration twice.
    #[error("Migration '{0}' is listed more than once in the manifest")]
    DuplicateMigration(String),

    /// Database operation error.
    #[error("Database error: {0}")]
    Database(String),

    /// A migration script failed to execute.
    #[error("Script for migration '{name}' failed: {message}")]
    Script {
        /// Migration whose script failed.
        name: String,
        /// Error reported by the store.
        message: String,
    },

    /// Migration not found.
    #[error("Migration '{0}' not found")]
    NotFound(String),

    /// Transaction state error (begin twice, commit without begin, ...).
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// An action failed while applying a run; the transaction was rolled back.
    #[error(transparent)]
    Apply(#[from] Box<ApplyError>),

    /// General migration error.
    #[error("Migration error: {0}")]
    Other(String),
}

impl MigrationError {
    /// Create a catalog error for the given file.
    pub fn catalog(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Catalog {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a script error.
    pub fn script(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Script {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create a transaction error.
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check if this error happened before any action executed.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Catalog { .. } | Self::DuplicateMigration(_)
        )
    }

    /// Get the apply failure, if this error came out of an apply run.
    pub fn as_apply(&self) -> Option<&ApplyError> {
        match self {
            Self::Apply(err) => Some(err),
            _ => None,
        }
    }
}

/// An action that failed during an apply run.
///
/// Returned after the surrounding transaction has been rolled back.
#[derive(Debug, Error)]
#[error("{action} migration '{name}' failed: {source}")]
pub struct ApplyError {
    /// Name of the migration whose action failed.
    pub name: String,
    /// The kind of action that failed.
    pub action: ActionKind,
    /// Underlying store error.
    #[source]
    pub source: MigrationError,
    /// Set when the rollback after the failure also failed.
    pub rollback_error: Option<MigrationError>,
}

impl ApplyError {
    /// Create a new apply error.
    pub fn new(name: impl Into<String>, action: ActionKind, source: MigrationError) -> Self {
        Self {
            name: name.into(),
            action,
            source,
            rollback_error: None,
        }
    }

    /// Check whether the transaction was rolled back cleanly.
    pub fn rolled_back(&self) -> bool {
        self.rollback_error.is_none()
    }
}

impl From<ApplyError> for MigrationError {
    fn from(err: ApplyError) -> Self {
        Self::Apply(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::NotFound("20231215_test".to_string());
        assert!(err.to_string().contains("20231215_test"));
    }

    #[test]
    fn test_catalog_error_display() {
        let err = MigrationError::catalog("migrations/order", "file not found");
        let msg = err.to_string();
        assert!(msg.contains("migrations/order"));
        assert!(msg.contains("file not found"));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_apply_error_display() {
        let err = ApplyError::new(
            "add_users",
            ActionKind::Add,
            MigrationError::script("add_users", "syntax error"),
        );
        let msg = err.to_string();
        assert!(msg.contains("add migration 'add_users'"));
        assert!(msg.contains("syntax error"));
        assert!(err.rolled_back());
    }

    #[test]
    fn test_apply_error_conversion() {
        let err: MigrationError =
            ApplyError::new("x", ActionKind::Remove, MigrationError::database("gone")).into();

        assert!(!err.is_load_error());
        let apply = err.as_apply().unwrap();
        assert_eq!(apply.name, "x");
        assert_eq!(apply.action, ActionKind::Remove);
    }
}
