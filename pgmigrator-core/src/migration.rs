//! Migration entities: desired migrations and applied records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A migration declared by the manifest.
///
/// Holds the do/undo script pair and their content hashes. Values are
/// immutable once constructed; two migrations with the same name are
/// considered equal when their do hashes match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    name: String,
    do_script: String,
    undo_script: String,
    do_hash: String,
    undo_hash: String,
}

impl Migration {
    /// Create a migration, hashing both scripts.
    pub fn new(
        name: impl Into<String>,
        do_script: impl Into<String>,
        undo_script: impl Into<String>,
    ) -> Self {
        let do_script = do_script.into();
        let undo_script = undo_script.into();
        let do_hash = compute_hash(&do_script);
        let undo_hash = compute_hash(&undo_script);

        Self {
            name: name.into(),
            do_script,
            undo_script,
            do_hash,
            undo_hash,
        }
    }

    /// Create a migration with hashes that are already known.
    ///
    /// The hashes are trusted as given. This is how rows loaded from the
    /// tracking table are rehydrated.
    pub fn with_hashes(
        name: impl Into<String>,
        do_script: impl Into<String>,
        undo_script: impl Into<String>,
        do_hash: impl Into<String>,
        undo_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            do_script: do_script.into(),
            undo_script: undo_script.into(),
            do_hash: do_hash.into(),
            undo_hash: undo_hash.into(),
        }
    }

    /// Migration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forward script.
    pub fn do_script(&self) -> &str {
        &self.do_script
    }

    /// Reverse script.
    pub fn undo_script(&self) -> &str {
        &self.undo_script
    }

    /// Hash of the forward script.
    pub fn do_hash(&self) -> &str {
        &self.do_hash
    }

    /// Hash of the reverse script.
    pub fn undo_hash(&self) -> &str {
        &self.undo_hash
    }

    /// Check whether the do side matches another migration.
    ///
    /// Only the name and do hash take part; undo-only edits are ignored.
    pub fn same_content(&self, other: &Migration) -> bool {
        self.name == other.name && self.do_hash == other.do_hash
    }

    /// Re-hash both scripts and compare with the stored hashes.
    pub fn verify_hashes(&self) -> bool {
        compute_hash(&self.do_script) == self.do_hash
            && compute_hash(&self.undo_script) == self.undo_hash
    }
}

/// A migration recorded as applied in the tracking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRecord {
    /// The applied migration as it was stored.
    pub migration: Migration,
    /// When the migration was executed.
    pub executed_at: DateTime<Utc>,
}

impl AppliedRecord {
    /// Create a record for a migration executed at the given time.
    pub fn new(migration: Migration, executed_at: DateTime<Utc>) -> Self {
        Self {
            migration,
            executed_at,
        }
    }

    /// Migration name.
    pub fn name(&self) -> &str {
        self.migration.name()
    }

    /// Hash of the forward script.
    pub fn do_hash(&self) -> &str {
        self.migration.do_hash()
    }

    /// Reverse script, run when the record is removed.
    pub fn undo_script(&self) -> &str {
        self.migration.undo_script()
    }
}

/// Compute the content hash of a script (hex-encoded SHA-256).
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
