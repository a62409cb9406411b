//! pgmigrator CLI - Command-line interface for manifest-driven migrations.

use clap::Parser;

use pgmigrator_cli::cli::{Cli, Command};
use pgmigrator_cli::commands;
use pgmigrator_cli::config::{self, Config, Settings};
use pgmigrator_cli::error::CliResult;
use pgmigrator_cli::{logging, output};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cwd = std::env::current_dir()?;

    // Dotenv values must be in place before clap reads the environment.
    let dotenv_files = config::load_dotenv(&cwd);

    let cli = Cli::parse();
    logging::init(cli.verbose);
    for path in &dotenv_files {
        tracing::debug!(path = %path.display(), "Loaded dotenv file");
    }

    if let Some(Command::Version) = cli.command {
        return commands::version::run().await;
    }

    let file = Config::discover(cli.config.as_deref(), &cwd)?;
    let settings = Settings::resolve(&cli.database, &cli.migrations, file)?;
    tracing::debug!(
        target_db = %settings.database.display_target(),
        table = %settings.table.qualified_name(),
        catalog = %settings.catalog.path.display(),
        "Resolved settings"
    );

    if cli.exec {
        commands::migrate::run(&settings, cli.format).await
    } else {
        commands::inspect::run(&settings, cli.format).await
    }
}
