//! Durability layer for storecat
//!
//! This crate handles everything that touches disk at the byte level:
//!
//! - WriteGuard: backup + temp file + atomic rename overwrite
//! - Startup recovery of interrupted writes
//! - Catalog directory layout
//! - JSON document reads
//! - Fault injection helpers for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document; // JSON document reads
pub mod paths; // Catalog directory layout
pub mod testing; // Fault injection for guarded writes
pub mod write_guard; // Crash-safe overwrite

pub use document::read_json;
pub use paths::{CatalogPaths, CATALOG_FILE_NAME, PATCH_FILE_NAME};
pub use write_guard::{RecoveryAction, WriteGuard, WriteGuardError, BACKUP_SUFFIX, TEMP_SUFFIX};
