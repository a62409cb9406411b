//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pgmigrator - ordered SQL migrations for PostgreSQL
///
/// Without --exec the planned actions are listed and nothing is changed.
#[derive(Parser, Debug)]
#[command(name = "pgmigrator")]
#[command(version)]
#[command(about = "pgmigrator - ordered SQL migrations for PostgreSQL", long_about = None)]
pub struct Cli {
    /// Execute the migration. Without this flag the planned actions are only listed
    #[arg(long)]
    pub exec: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML configuration file (default: ./migrator.toml when present)
    #[arg(long, env = "MIGRATOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub migrations: MigrationArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display version information
    Version,
}

/// Output format for planned actions and outcomes
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

/// Database connection options
#[derive(Args, Debug, Default)]
pub struct DatabaseArgs {
    /// Database connection URL; takes precedence over the individual options
    #[arg(long, env = "MIGRATOR_DB_URL")]
    pub url: Option<String>,

    /// Database hostname [default: localhost]
    #[arg(long, env = "MIGRATOR_DB_HOST")]
    pub host: Option<String>,

    /// Database port [default: 5432]
    #[arg(long, env = "MIGRATOR_DB_PORT")]
    pub port: Option<u16>,

    /// Database user [default: postgres]
    #[arg(long, env = "MIGRATOR_DB_USER")]
    pub user: Option<String>,

    /// Database password
    #[arg(long, env = "MIGRATOR_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name [default: postgres]
    #[arg(long, env = "MIGRATOR_DB_DATABASE")]
    pub database: Option<String>,
}

/// Migration catalog and tracking table options
#[derive(Args, Debug, Default)]
pub struct MigrationArgs {
    /// Database schema holding the tracking table [default: public]
    #[arg(long, env = "MIGRATOR_DB_SCHEMA_NAME")]
    pub schema_name: Option<String>,

    /// Tracking table name [default: schema_versions]
    #[arg(long, env = "MIGRATOR_TABLE_NAME")]
    pub schema_table: Option<String>,

    /// Path to the migration files directory [default: ./migrations]
    #[arg(long, env = "MIGRATOR_FILES_PATH")]
    pub path: Option<PathBuf>,

    /// Name of the manifest file inside the migrations directory [default: order]
    #[arg(long, env = "MIGRATOR_ORDER_FILE")]
    pub order_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "pgmigrator",
            "--exec",
            "--format",
            "json",
            "--port",
            "6543",
            "--path",
            "db/migrations",
        ])
        .unwrap();

        assert!(cli.exec);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.database.port, Some(6543));
        assert_eq!(cli.migrations.path, Some(PathBuf::from("db/migrations")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_version_subcommand() {
        let cli = Cli::try_parse_from(["pgmigrator", "version"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Version)));
    }
}
