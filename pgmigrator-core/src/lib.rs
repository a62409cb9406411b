//! # pgmigrator-core
//!
//! Reconciliation and transactional application of ordered SQL migrations.
//!
//! A migration is a named pair of scripts: a *do* script that applies it
//! and an *undo* script that reverts it. The desired sequence comes from a
//! manifest on disk; the applied sequence comes from a tracking table. The
//! engine compares the two and applies the difference inside a single
//! transaction.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐                         ┌──────────────┐
//! │ Catalog      │──── desired ───┐  ┌──── │ Tracking     │
//! │ (order file) │                ▼  ▼     │ store        │
//! └──────────────┘           ┌───────────┐ └──────────────┘
//!                            │ Reconcile │        ▲
//!                            └───────────┘        │
//!                                  │ actions      │
//!                                  ▼              │
//!                            ┌───────────┐        │
//!                            │ Applier   │────────┘
//!                            └───────────┘  one transaction
//! ```
//!
//! Reconciliation is a longest-common-prefix walk: matching migrations are
//! skipped, everything after the first divergence is reverted in reverse
//! order and re-applied in manifest order. Applied migrations that precede
//! the manifest's first entry are *shrunk*, meaning they are left alone.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pgmigrator_core::{CatalogConfig, MemoryStore, Migrator, MigratorConfig};
//!
//! async fn run() -> pgmigrator_core::MigrateResult<()> {
//!     let config = MigratorConfig::new()
//!         .catalog(CatalogConfig::new("./migrations"));
//!     let migrator = Migrator::new(config, MemoryStore::new());
//!
//!     migrator.initialize().await?;
//!
//!     for action in migrator.inspect().await? {
//!         println!("{}", action);
//!     }
//!
//!     let report = migrator
//!         .migrate(|outcome| println!("{} {} {}", outcome.action, outcome.name, outcome.success))
//!         .await?;
//!     println!("{}", report.summary());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Catalog layout
//!
//! ```text
//! migrations/
//! ├── order              # one name per line, in application order
//! ├── initial.do.sql
//! ├── initial.undo.sql
//! ├── add_posts.do.sql
//! └── add_posts.undo.sql
//! ```

pub mod action;
pub mod apply;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod history;
pub mod memory;
pub mod migration;
pub mod reconcile;

pub use action::{Action, ActionKind, ActionOutcome};
pub use apply::Applier;
pub use catalog::{CatalogConfig, CatalogLoader, parse_manifest};
pub use engine::{MigrationReport, MigrationState, Migrator, MigratorConfig};
pub use error::{ApplyError, MigrateResult, MigrationError};
pub use history::{TrackingStore, TrackingTable, quote_ident};
pub use memory::MemoryStore;
pub use migration::{AppliedRecord, Migration, compute_hash};
pub use reconcile::{MigrationIndex, has_changes, reconcile};
