//! storecat - Crash-safe store catalog engine
//!
//! A catalog lives in two JSON documents: a large base catalog
//! (`Catalog.json`) and a small patch overlay (`CatalogPatch.json`).
//! Readers see one merged, cached view in which patch entries shadow base
//! entries with the same SKU. Writers go to whichever document owns the
//! item, through a guarded overwrite that never leaves a document
//! half-written.
//!
//! # Quick Start
//!
//! ```ignore
//! use storecat::{CatalogItem, CatalogQuery, CatalogStore, Category, Localization};
//!
//! let store = CatalogStore::open("/data/catalog")?;
//!
//! let sku = store.next_sku_id()?;
//! let item = CatalogItem::new(sku, Category::new("Hats", 0), Localization::new("en_us", "Wizard Hat", 300));
//! store.save(&item)?;
//!
//! let hats = store.query(&CatalogQuery::new("Hats", "wizard"))?;
//! ```
//!
//! # Architecture
//!
//! - `storecat-core`: item model, document shapes, errors, resolver seam
//! - `storecat-durability`: guarded overwrite, recovery, directory layout
//! - `storecat-storage`: the patch and base stores
//! - `storecat-engine`: merged view cache, queries, modifier index, store

pub use storecat_core::{
    display_name, CatalogDocument, CatalogItem, Category, Component, Error, Localization,
    Modifier, PatchDocument, PrototypeRef, PrototypeResolver, Provenance, Result, SkuId,
    StaticResolver, ALL_CATEGORIES, MIN_GENERATED_SKU,
};
pub use storecat_durability::{
    CatalogPaths, RecoveryAction, WriteGuard, WriteGuardError, CATALOG_FILE_NAME, PATCH_FILE_NAME,
};
pub use storecat_engine::{
    run_query, CancellationToken, CatalogConfig, CatalogQuery, CatalogStore, CatalogStoreBuilder,
    CategoryFilter, MergedView, ModifierRefresh, SortOrder, CONFIG_FILE_NAME,
};
pub use storecat_storage::{BaseCatalog, PatchStore};
