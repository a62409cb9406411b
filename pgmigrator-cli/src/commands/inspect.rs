//! `pgmigrator` without `--exec` - list the planned actions.

use pgmigrator_core::has_changes;
use serde_json::json;
use tracing::info;

use crate::cli::OutputFormat;
use crate::commands::migrator;
use crate::config::Settings;
use crate::error::CliResult;
use crate::output;

/// Run the inspect command
pub async fn run(settings: &Settings, format: OutputFormat) -> CliResult<()> {
    let migrator = migrator(settings)?;
    migrator.initialize().await?;

    let actions = migrator.inspect().await?;
    migrator.store().pool().close();
    info!(actions = actions.len(), "Reconciled migrations");

    match format {
        OutputFormat::Json => {
            let doc = json!({
                "actions": actions,
                "has_changes": has_changes(&actions),
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            for action in &actions {
                output::action(action);
            }
            if !has_changes(&actions) {
                output::newline();
                output::success("Database is up to date");
            } else {
                output::newline();
                output::dim("Run again with --exec to apply.");
            }
        }
    }

    Ok(())
}
