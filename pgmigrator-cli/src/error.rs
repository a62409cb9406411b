//! CLI error types and result alias.

use miette::Diagnostic;
use pgmigrator_core::MigrationError;
use pgmigrator_postgres::PgError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(pgmigrator::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(pgmigrator::config),
        help("check migrator.toml, the MIGRATOR_* environment variables and the command-line flags")
    )]
    Config(String),

    /// Catalog could not be loaded
    #[error("{0}")]
    #[diagnostic(code(pgmigrator::catalog))]
    Catalog(MigrationError),

    /// Migration run failed and was rolled back
    #[error("{0}")]
    #[diagnostic(code(pgmigrator::migration))]
    Migration(MigrationError),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(pgmigrator::database))]
    Database(String),

    /// Output serialization error
    #[error("Output error: {0}")]
    #[diagnostic(code(pgmigrator::output))]
    Output(#[from] serde_json::Error),
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        if err.is_load_error() {
            CliError::Catalog(err)
        } else {
            CliError::Migration(err)
        }
    }
}

impl From<PgError> for CliError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Config(msg) => CliError::Config(msg),
            other => CliError::Database(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}
