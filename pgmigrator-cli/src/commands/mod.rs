//! CLI command implementations.

pub mod inspect;
pub mod migrate;
pub mod version;

use pgmigrator_core::{Migrator, MigratorConfig};
use pgmigrator_postgres::PgTrackingStore;

use crate::config::Settings;
use crate::error::CliResult;

/// Build a migrator over the configured database and catalog.
pub(crate) fn migrator(settings: &Settings) -> CliResult<Migrator<PgTrackingStore>> {
    let store = PgTrackingStore::connect(settings.database.clone(), settings.table.clone())?;
    let config = MigratorConfig::new().catalog(settings.catalog.clone());
    Ok(Migrator::new(config, store))
}
