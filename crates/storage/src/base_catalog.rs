//! BaseCatalog: the bulk base document
//!
//! `Catalog.json` is large and rarely written. It is optional: a deployment
//! may run patch-only, in which case loads return an empty document and
//! edits report "not found" without creating the file.
//!
//! Edits are strictly in place. An entry keeps its position in `Entries`
//! because tooling outside this system consumes the document and is
//! order-sensitive. Every persisted edit refreshes the document timestamp.

use chrono::Utc;
use std::path::{Path, PathBuf};
use storecat_core::{CatalogDocument, CatalogItem, Modifier, Result, SkuId};
use storecat_durability::{read_json, WriteGuard};
use tracing::{debug, info};

/// The large, rarely mutated base document
#[derive(Debug, Clone)]
pub struct BaseCatalog {
    path: PathBuf,
    guard: WriteGuard,
    pretty: bool,
}

impl BaseCatalog {
    /// Create a catalog over `path`
    pub fn new(path: impl Into<PathBuf>, guard: WriteGuard) -> Self {
        Self {
            path: path.into(),
            guard,
            pretty: true,
        }
    }

    /// Pretty-print (default) or compact JSON
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the document exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the document, or an empty one if the file is absent
    pub fn load(&self) -> Result<CatalogDocument> {
        Ok(read_json::<CatalogDocument>(&self.path)?.unwrap_or_default())
    }

    /// Entry with `sku`, if present
    pub fn get(&self, sku: SkuId) -> Result<Option<CatalogItem>> {
        Ok(self
            .load()?
            .entries
            .into_iter()
            .find(|item| item.sku_id == sku))
    }

    /// Replace the entry with the same SKU at its existing position
    ///
    /// Returns false if no such entry exists; nothing is written then.
    pub fn update_entry_in_place(&self, item: &CatalogItem) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(index) = doc.position(item.sku_id) else {
            debug!(sku = %item.sku_id, "Base entry not present, nothing to update");
            return Ok(false);
        };

        doc.entries[index] = item.clone();
        self.persist(&mut doc)?;
        info!(sku = %item.sku_id, index, "Base entry updated in place");
        Ok(true)
    }

    /// Remove the entry with `sku`, keeping the order of the rest
    pub fn remove_entry(&self, sku: SkuId) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(index) = doc.position(sku) else {
            debug!(sku = %sku, "Base entry not present, nothing to remove");
            return Ok(false);
        };

        doc.entries.remove(index);
        self.persist(&mut doc)?;
        info!(sku = %sku, index, entries = doc.entries.len(), "Base entry removed");
        Ok(true)
    }

    /// Replace only the modifiers of the entry with `sku`
    pub fn update_modifiers_only(&self, sku: SkuId, modifiers: &[Modifier]) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(index) = doc.position(sku) else {
            debug!(sku = %sku, "Base entry not present, modifiers unchanged");
            return Ok(false);
        };

        doc.entries[index].modifiers = modifiers.to_vec();
        self.persist(&mut doc)?;
        info!(sku = %sku, modifiers = modifiers.len(), "Base entry modifiers updated");
        Ok(true)
    }

    fn persist(&self, doc: &mut CatalogDocument) -> Result<()> {
        doc.touch(Utc::now());
        self.guard.overwrite_json(&self.path, &*doc, self.pretty)?;
        Ok(())
    }
}
