//! CLI configuration handling.
//!
//! Settings are layered: built-in defaults, then `migrator.toml`, then
//! environment variables and flags (clap reads both).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pgmigrator_core::{CatalogConfig, TrackingTable};
use pgmigrator_postgres::PgConfig;

use crate::cli::{DatabaseArgs, MigrationArgs};
use crate::error::{CliError, CliResult};

/// Default config file name (looked up in the working directory)
pub const CONFIG_FILE_NAME: &str = "migrator.toml";

/// Environment variable selecting the dotenv profile
pub const ENV_PROFILE_VAR: &str = "MIGRATOR_ENV";

/// pgmigrator configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Migration configuration
    pub migrations: MigrationsConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the explicit file, or `migrator.toml` in `dir` when it exists.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = dir.join(CONFIG_FILE_NAME);
                if default.is_file() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL; takes precedence over the individual fields
    pub url: Option<String>,
    /// Hostname
    pub host: Option<String>,
    /// Port
    pub port: Option<u16>,
    /// User
    pub user: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Database name
    pub database: Option<String>,
}

/// Migration configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Directory holding the manifest and scripts
    pub path: Option<PathBuf>,
    /// Manifest file name
    pub order_file: Option<String>,
    /// Schema of the tracking table
    pub schema: Option<String>,
    /// Name of the tracking table
    pub table: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Database connection
    pub database: PgConfig,
    /// Tracking table location
    pub table: TrackingTable,
    /// Migration catalog location
    pub catalog: CatalogConfig,
}

impl Settings {
    /// Merge flags/environment over the file configuration over defaults.
    pub fn resolve(db: &DatabaseArgs, migrations: &MigrationArgs, file: Config) -> CliResult<Self> {
        let database = resolve_database(db, file.database)?;

        let mut table = TrackingTable::default();
        if let Some(schema) = migrations.schema_name.clone().or(file.migrations.schema) {
            table = table.with_schema(schema);
        }
        if let Some(name) = migrations.schema_table.clone().or(file.migrations.table) {
            table = table.with_table(name);
        }
        if table.schema.is_empty() || table.table.is_empty() {
            return Err(CliError::Config(
                "tracking table schema and name must not be empty".to_string(),
            ));
        }

        let mut catalog = CatalogConfig::default();
        if let Some(path) = migrations.path.clone().or(file.migrations.path) {
            catalog.path = path;
        }
        if let Some(order_file) = migrations.order_file.clone().or(file.migrations.order_file) {
            catalog = catalog.order_file(order_file);
        }

        Ok(Self {
            database,
            table,
            catalog,
        })
    }
}

fn resolve_database(args: &DatabaseArgs, file: DatabaseConfig) -> CliResult<PgConfig> {
    if let Some(url) = args.url.clone().or(file.url) {
        return Ok(PgConfig::from_url(&url)?);
    }

    let mut builder = PgConfig::builder();
    if let Some(host) = args.host.clone().or(file.host) {
        builder = builder.host(host);
    }
    if let Some(port) = args.port.or(file.port) {
        builder = builder.port(port);
    }
    if let Some(user) = args.user.clone().or(file.user) {
        builder = builder.user(user);
    }
    if let Some(password) = args.password.clone().or(file.password) {
        builder = builder.password(password);
    }
    if let Some(database) = args.database.clone().or(file.database) {
        builder = builder.database(database);
    }
    Ok(builder.build()?)
}

/// Load dotenv files; values already in the environment are kept.
///
/// Earlier files win: `.env.{MIGRATOR_ENV}.local`, `.env.{MIGRATOR_ENV}`,
/// `.env.local`, `.env`.
pub fn load_dotenv(dir: &Path) -> Vec<PathBuf> {
    let mut loaded = Vec::new();
    for name in dotenv_files(std::env::var(ENV_PROFILE_VAR).ok().as_deref()) {
        let path = dir.join(&name);
        if path.is_file() && dotenvy::from_path(&path).is_ok() {
            loaded.push(path);
        }
    }
    loaded
}

/// Dotenv file names in load order.
pub fn dotenv_files(profile: Option<&str>) -> Vec<String> {
    let mut files = Vec::with_capacity(4);
    if let Some(profile) = profile.filter(|p| !p.is_empty()) {
        files.push(format!(".env.{}.local", profile));
        files.push(format!(".env.{}", profile));
    }
    files.push(".env.local".to_string());
    files.push(".env".to_string());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings =
            Settings::resolve(&DatabaseArgs::default(), &MigrationArgs::default(), Config::default())
                .unwrap();

        assert_eq!(settings.database.host, "localhost");
        assert_eq!(settings.database.port, 5432);
        assert_eq!(settings.database.user, "postgres");
        assert_eq!(settings.database.database, "postgres");
        assert_eq!(settings.table, TrackingTable::default());
        assert_eq!(settings.catalog, CatalogConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults_and_flags_override_file() {
        let file: Config = toml::from_str(
            r#"
            [database]
            host = "db.internal"
            port = 6543
            database = "app"

            [migrations]
            path = "sql"
            table = "versions"
            "#,
        )
        .unwrap();
        let db = DatabaseArgs {
            port: Some(7000),
            ..Default::default()
        };
        let migrations = MigrationArgs {
            schema_name: Some("ops".to_string()),
            ..Default::default()
        };

        let settings = Settings::resolve(&db, &migrations, file).unwrap();

        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, 7000);
        assert_eq!(settings.database.database, "app");
        assert_eq!(settings.table.qualified_name(), r#""ops"."versions""#);
        assert_eq!(settings.catalog.path, PathBuf::from("sql"));
        assert_eq!(settings.catalog.order_file, "order");
    }

    #[test]
    fn test_url_wins_over_components() {
        let db = DatabaseArgs {
            url: Some("postgres://u:p@remote:5555/prod".to_string()),
            host: Some("ignored".to_string()),
            ..Default::default()
        };

        let settings = Settings::resolve(&db, &MigrationArgs::default(), Config::default()).unwrap();
        assert_eq!(settings.database.host, "remote");
        assert_eq!(settings.database.port, 5555);
        assert_eq!(settings.database.database, "prod");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let db = DatabaseArgs {
            url: Some("mysql://localhost/db".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            Settings::resolve(&db, &MigrationArgs::default(), Config::default()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[migrations]\norder_file = \"manifest\"\n",
        )
        .unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config.migrations.order_file.as_deref(), Some("manifest"));

        assert!(Config::discover(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[database]\nhots = \"typo\"\n").unwrap();

        assert!(matches!(Config::load(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_dotenv_files() {
        assert_eq!(dotenv_files(None), vec![".env.local", ".env"]);
        assert_eq!(
            dotenv_files(Some("test")),
            vec![".env.test.local", ".env.test", ".env.local", ".env"]
        );
    }
}
