//! Migration catalog: the manifest and its script files.
//!
//! ```text
//! migrations/
//! ├── order                  # one migration name per line
//! ├── initial.do.sql
//! ├── initial.undo.sql
//! ├── add_posts.do.sql
//! └── add_posts.undo.sql
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::{MigrateResult, MigrationError};
use crate::migration::Migration;

/// Where the catalog lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Directory holding the manifest and script files.
    pub path: PathBuf,
    /// Manifest file name, relative to `path`.
    pub order_file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./migrations"),
            order_file: "order".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Create a configuration for the given directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the manifest file name.
    pub fn order_file(mut self, name: impl Into<String>) -> Self {
        self.order_file = name.into();
        self
    }

    /// Path of the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(&self.order_file)
    }

    /// Path of a migration's do script.
    pub fn do_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{}.do.sql", name))
    }

    /// Path of a migration's undo script.
    pub fn undo_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{}.undo.sql", name))
    }
}

/// Reads the desired migration sequence from disk.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    config: CatalogConfig,
}

impl CatalogLoader {
    /// Create a loader.
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Load every migration named by the manifest, in manifest order.
    pub async fn load(&self) -> MigrateResult<Vec<Migration>> {
        let names = self.read_manifest().await?;
        debug!(count = names.len(), "Read migration manifest");

        let migrations = try_join_all(names.iter().map(|name| self.read_migration(name))).await?;

        info!(
            path = %self.config.path.display(),
            count = migrations.len(),
            "Loaded migration catalog"
        );
        Ok(migrations)
    }

    /// Read the ordered list of migration names.
    pub async fn read_manifest(&self) -> MigrateResult<Vec<String>> {
        let path = self.config.manifest_path();
        let content = read_file(&path).await?;
        let names = parse_manifest(&content);

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(MigrationError::DuplicateMigration(name.clone()));
            }
        }

        Ok(names)
    }

    async fn read_migration(&self, name: &str) -> MigrateResult<Migration> {
        let do_path = self.config.do_path(name);
        let undo_path = self.config.undo_path(name);
        let (do_script, undo_script) =
            futures::try_join!(read_file(&do_path), read_file(&undo_path))?;

        Ok(Migration::new(name, do_script, undo_script))
    }
}

/// Split manifest text into migration names.
///
/// Blank lines and `#` comments are ignored; names are trimmed.
pub fn parse_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

async fn read_file(path: &Path) -> MigrateResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MigrationError::catalog(path, e.to_string()))
}
