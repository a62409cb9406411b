//! # pgmigrator
//!
//! Manifest-driven schema migrations for PostgreSQL.
//!
//! pgmigrator provides:
//! - A plain-file migration catalog: an `order` manifest plus one
//!   `.do.sql`/`.undo.sql` pair per migration
//! - Longest-common-prefix reconciliation between the manifest and the
//!   tracking table, with content hashes detecting edited migrations
//! - All-or-nothing application inside a single database transaction
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pgmigrator::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PgTrackingStore::connect(
//!         PgConfig::from_url("postgresql://localhost/mydb")?,
//!         TrackingTable::default(),
//!     )?;
//!     let migrator = Migrator::new(
//!         MigratorConfig::new().catalog(CatalogConfig::new("./migrations")),
//!         store,
//!     );
//!
//!     migrator.initialize().await?;
//!     let report = migrator
//!         .migrate(|outcome| println!("{} {}: {}", outcome.action, outcome.name, outcome.success))
//!         .await?;
//!     println!("{}", report.summary());
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Reconciliation, catalog loading and the apply engine.
pub mod core {
    pub use pgmigrator_core::*;
}

/// PostgreSQL tracking store.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres {
    pub use pgmigrator_postgres::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        Action, ActionKind, ActionOutcome, AppliedRecord, CatalogConfig, MemoryStore,
        MigrateResult, Migration, MigrationError, MigrationReport, Migrator, MigratorConfig,
        TrackingStore, TrackingTable, reconcile,
    };
    #[cfg(feature = "postgres")]
    pub use crate::postgres::{PgConfig, PgTrackingStore};
}

// Re-export key types at the crate root
pub use pgmigrator_core::{MigrateResult, MigrationError};
