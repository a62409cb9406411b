//! `pgmigrator --exec` - apply the planned actions in one transaction.

use pgmigrator_core::ActionOutcome;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::migrator;
use crate::config::Settings;
use crate::error::CliResult;
use crate::output;

/// Run the migrate command
pub async fn run(settings: &Settings, format: OutputFormat) -> CliResult<()> {
    let migrator = migrator(settings)?;
    migrator.initialize().await?;

    let mut outcomes: Vec<ActionOutcome> = Vec::new();
    let result = migrator
        .migrate(|outcome| {
            if format == OutputFormat::Text {
                output::outcome(outcome);
            }
            outcomes.push(outcome.clone());
        })
        .await;
    migrator.store().pool().close();

    match format {
        OutputFormat::Json => {
            let doc = match &result {
                Ok(report) => json!({
                    "success": true,
                    "outcomes": outcomes,
                    "report": report,
                }),
                Err(err) => json!({
                    "success": false,
                    "outcomes": outcomes,
                    "error": err.to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            if let Ok(report) = &result {
                output::newline();
                output::success(&report.summary());
            }
        }
    }

    result?;
    Ok(())
}
