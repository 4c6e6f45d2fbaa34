//! PatchStore: the overlay document
//!
//! ## Design: STATELESS FACADE
//!
//! PatchStore holds only the document path and write settings. Every
//! operation re-reads `CatalogPatch.json` from disk, edits it, and writes it
//! back through the [`WriteGuard`]. Serializing mutations is the caller's job
//! (the catalog store's lock).
//!
//! The document is a bare JSON array of items. New items and edits to items
//! that already live here land in this document; any SKU present here
//! shadows the same SKU in the base catalog.

use std::path::{Path, PathBuf};
use storecat_core::{CatalogItem, Modifier, PatchDocument, Result, SkuId};
use storecat_durability::{read_json, WriteGuard};
use tracing::{debug, info};

/// The small, frequently mutated overlay document
#[derive(Debug, Clone)]
pub struct PatchStore {
    path: PathBuf,
    guard: WriteGuard,
    pretty: bool,
}

impl PatchStore {
    /// Create a store over `path`
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

    /// Load the document, creating an empty `[]` document on first run
    pub fn load(&self) -> Result<PatchDocument> {
        match read_json::<PatchDocument>(&self.path)? {
            Some(doc) => Ok(doc),
            None => {
                info!(path = %self.path.display(), "Creating empty patch document");
                let doc = PatchDocument::new();
                self.persist(&doc)?;
                Ok(doc)
            }
        }
    }

    /// Entry with `sku`, if present
    pub fn get(&self, sku: SkuId) -> Result<Option<CatalogItem>> {
        Ok(self
            .read_existing()?
            .into_iter()
            .find(|item| item.sku_id == sku))
    }

    /// Replace any entry with the same SKU and append `item`
    pub fn upsert(&self, item: &CatalogItem) -> Result<()> {
        let mut doc = self.read_existing()?;
        let before = doc.len();
        doc.retain(|existing| existing.sku_id != item.sku_id);
        let replaced = doc.len() != before;
        doc.push(item.clone());
        self.persist(&doc)?;

        info!(sku = %item.sku_id, replaced, entries = doc.len(), "Patch entry saved");
        Ok(())
    }

    /// Remove the entry with `sku`
    ///
    /// Returns true iff an entry was removed. Writes only on change.
    pub fn remove(&self, sku: SkuId) -> Result<bool> {
        let mut doc = self.read_existing()?;
        let before = doc.len();
        doc.retain(|existing| existing.sku_id != sku);
        if doc.len() == before {
            debug!(sku = %sku, "Patch entry not present, nothing to remove");
            return Ok(false);
        }

        self.persist(&doc)?;
        info!(sku = %sku, entries = doc.len(), "Patch entry removed");
        Ok(true)
    }

    /// Replace only the modifiers of the entry with `sku`
    ///
    /// Other fields are taken from the document as it is on disk now, so a
    /// stale in-memory copy of the item cannot clobber them.
    pub fn update_modifiers_only(&self, sku: SkuId, modifiers: &[Modifier]) -> Result<bool> {
        let mut doc = self.read_existing()?;
        let Some(entry) = doc.iter_mut().find(|item| item.sku_id == sku) else {
            debug!(sku = %sku, "Patch entry not present, modifiers unchanged");
            return Ok(false);
        };

        entry.modifiers = modifiers.to_vec();
        self.persist(&doc)?;
        info!(sku = %sku, modifiers = modifiers.len(), "Patch entry modifiers updated");
        Ok(true)
    }

    /// Read without creating the document; absent means empty
    fn read_existing(&self) -> Result<PatchDocument> {
        Ok(read_json::<PatchDocument>(&self.path)?.unwrap_or_default())
    }

    fn persist(&self, doc: &[CatalogItem]) -> Result<()> {
        self.guard.overwrite_json(&self.path, doc, self.pretty)?;
        Ok(())
    }
}
