//! pgmigrator CLI - Command-line interface for manifest-driven migrations.
//!
//! This crate provides the `pgmigrator` binary: it lists the actions needed
//! to bring a PostgreSQL database in line with a migration manifest, and
//! applies them in one transaction with `--exec`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
