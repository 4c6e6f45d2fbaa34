//! Storage layer for storecat
//!
//! This crate implements the two physical catalog stores:
//! - PatchStore: the overlay document (`CatalogPatch.json`)
//! - BaseCatalog: the bulk base document (`Catalog.json`)
//!
//! Both are stateless facades over their files. Every write goes through
//! the durability layer's `WriteGuard`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod base_catalog;
pub mod patch_store;

pub use base_catalog::BaseCatalog;
pub use patch_store::PatchStore;
